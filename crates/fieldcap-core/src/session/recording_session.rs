use crate::{naming, session::Segment};

use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Which tracks a session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Camera only.
    VideoOnly,
    /// Camera plus a paired audio span per segment, merged on rotation.
    VideoWithAudio,
}

impl CaptureMode {
    /// Filename prefix for this mode's deliverables.
    pub fn prefix(self) -> &'static str {
        match self {
            CaptureMode::VideoOnly => naming::VIDEO_PREFIX,
            CaptureMode::VideoWithAudio => naming::MERGED_PREFIX,
        }
    }

    /// Whether segments carry an audio track.
    pub fn with_audio(self) -> bool {
        matches!(self, CaptureMode::VideoWithAudio)
    }
}

/// Controller lifecycle: `Idle → Recording → (Rotating)* → Stopping → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session.
    Idle,
    /// Capturing into the active segment.
    Recording,
    /// Closing one segment and opening the next.
    Rotating,
    /// Closing the last segment and draining background work.
    Stopping,
}

/// One start/stop cycle of the video controller.
#[derive(Debug)]
pub struct RecordingSession {
    id: u64,
    mode: CaptureMode,
    state: SessionState,
    working_dir: PathBuf,
    segments: Vec<Segment>,
}

impl RecordingSession {
    pub(crate) fn new(id: u64, mode: CaptureMode, working_dir: PathBuf) -> Self {
        Self {
            id,
            mode,
            state: SessionState::Recording,
            working_dir,
            segments: Vec::new(),
        }
    }

    /// Session id embedded in deliverable names.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Capture mode chosen at start.
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// All segments in ordinal order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment currently capturing, if any.
    pub fn active_segment(&self) -> Option<&Segment> {
        self.segments.last().filter(|s| s.is_active())
    }

    /// Open the next segment. Any still-active segment is closed first so at
    /// most one segment is ever active.
    pub(crate) fn open_segment(&mut self, started_at: DateTime<Local>) -> &Segment {
        if let Some(active) = self.segments.last_mut().filter(|s| s.is_active()) {
            active.close(started_at);
        }

        let ordinal = self.segments.len() as u32 + 1;
        let video_path = self
            .working_dir
            .join(naming::temp_video_name(self.id, ordinal, &started_at));

        self.segments
            .push(Segment::open(ordinal, started_at, video_path));
        &self.segments[self.segments.len() - 1]
    }

    /// Move the active segment's start to when capture really began.
    pub(crate) fn restamp_active(&mut self, started_at: DateTime<Local>) {
        if let Some(active) = self.segments.last_mut().filter(|s| s.is_active()) {
            active.started_at = started_at;
        }
    }

    /// Close the active segment, attaching the paired audio file if any.
    pub(crate) fn close_active(
        &mut self,
        ended_at: DateTime<Local>,
        audio_path: Option<PathBuf>,
    ) -> Option<Segment> {
        let active = self.segments.last_mut().filter(|s| s.is_active())?;
        active.close(ended_at);
        active.audio_path = audio_path;
        Some(active.clone())
    }

    /// Mark whether a merge is running on a closed segment.
    pub(crate) fn set_merging(&mut self, ordinal: u32, merging: bool) {
        if let Some(segment) = self.segments.iter_mut().find(|s| s.ordinal == ordinal) {
            segment.merging = merging;
        }
    }

    /// Record the merge output for a closed segment.
    pub(crate) fn set_merged(&mut self, ordinal: u32, merged_path: PathBuf) {
        if let Some(segment) = self.segments.iter_mut().find(|s| s.ordinal == ordinal) {
            segment.merged_path = Some(merged_path);
            segment.merging = false;
        }
    }

    /// Copy of the current session for observers.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            mode: self.mode,
            state: self.state,
            segments: self.segments.clone(),
        }
    }
}

/// Point-in-time copy of a running session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Session id.
    pub id: u64,
    /// Capture mode.
    pub mode: CaptureMode,
    /// Lifecycle state at snapshot time.
    pub state: SessionState,
    /// Segments in ordinal order.
    pub segments: Vec<Segment>,
}

impl SessionSnapshot {
    /// Number of segments without an end time.
    pub fn active_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_active()).count()
    }

    /// The active segment, if any.
    pub fn active_segment(&self) -> Option<&Segment> {
        self.segments.iter().find(|s| s.is_active())
    }
}

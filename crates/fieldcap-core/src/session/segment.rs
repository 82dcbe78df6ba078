use crate::naming;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeDelta};

/// One bounded slice of a recording session.
///
/// A segment is active until [`Segment::close`] stamps its end time. The
/// record keeps every path the segment's bytes have lived at so the
/// controller always knows which file is the deliverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position within the session.
    pub ordinal: u32,
    /// When capture for this segment started.
    pub started_at: DateTime<Local>,
    /// When capture stopped. `None` while active.
    pub ended_at: Option<DateTime<Local>>,
    /// Temp video file the camera writes to.
    pub video_path: PathBuf,
    /// Temp audio file of the paired span (combined mode only).
    pub audio_path: Option<PathBuf>,
    /// Output of a successful merge.
    pub merged_path: Option<PathBuf>,
    /// The muxer is working on this segment's files.
    pub merging: bool,
    /// Permanent name, once finalized.
    pub final_path: Option<PathBuf>,
}

impl Segment {
    pub(crate) fn open(ordinal: u32, started_at: DateTime<Local>, video_path: PathBuf) -> Self {
        Self {
            ordinal,
            started_at,
            ended_at: None,
            video_path,
            audio_path: None,
            merged_path: None,
            merging: false,
            final_path: None,
        }
    }

    /// Whether the segment is still capturing.
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Stamp the end time. The end is kept strictly after the start even when
    /// the clock has not advanced between open and close.
    pub(crate) fn close(&mut self, ended_at: DateTime<Local>) {
        let floor = self.started_at + TimeDelta::milliseconds(1);
        self.ended_at = Some(ended_at.max(floor));
    }

    /// File that currently holds this segment's bytes.
    pub fn deliverable(&self) -> &Path {
        self.final_path
            .as_deref()
            .or(self.merged_path.as_deref())
            .unwrap_or(&self.video_path)
    }
}

/// Finalized segment handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRecord {
    /// Where the deliverable lives now.
    pub path: PathBuf,
    /// Capture start.
    pub started_at: DateTime<Local>,
    /// Capture end.
    pub ended_at: DateTime<Local>,
}

impl SegmentRecord {
    /// `HH:MM:SS` start label used by the upload collaborator.
    pub fn start_label(&self) -> String {
        naming::clock_label(&self.started_at)
    }

    /// `HH:MM:SS` end label used by the upload collaborator.
    pub fn end_label(&self) -> String {
        naming::clock_label(&self.ended_at)
    }
}

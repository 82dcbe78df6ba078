//! Size-driven segment rotation.
//!
//! One segmenter runs per session on its own worker thread. Video-only
//! sessions just restart the camera onto a new file; combined sessions also
//! cycle the audio span and queue the closed pair for merging.
//!
//! The active file is polled, so a segment can overshoot the threshold by
//! whatever the camera writes in one poll interval. If the camera cannot be
//! restarted on rotation, the new segment waits with no file and the camera
//! is retried on every poll until it records again.

use crate::{
    AudioCaptureEngine, CoreResult,
    merge::MergeRequest,
    session::{RecordingSession, Segment, SessionState},
    video::{
        device::{SharedCaptureDevice, lock_camera},
        merge_queue::{MergeQueue, MergeSummary},
    },
    worker::StopSignal,
};

use std::{
    fs,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::Local;
use tracing::{debug, error, info, warn};

pub(crate) struct Segmenter {
    session: Arc<Mutex<RecordingSession>>,
    camera: SharedCaptureDevice,
    audio: Option<Arc<AudioCaptureEngine>>,
    merges: Option<MergeQueue>,
    threshold_bytes: u64,
    poll_interval: Duration,
    camera_down: bool,
}

impl Segmenter {
    pub(crate) fn new(
        session: Arc<Mutex<RecordingSession>>,
        camera: SharedCaptureDevice,
        audio: Option<Arc<AudioCaptureEngine>>,
        merges: Option<MergeQueue>,
        threshold_bytes: u64,
        poll_interval: Duration,
    ) -> Self {
        Self {
            session,
            camera,
            audio,
            merges,
            threshold_bytes,
            poll_interval,
            camera_down: false,
        }
    }

    /// Worker thread name for this segmenter's mode.
    pub(crate) fn worker_name(&self) -> &'static str {
        if self.audio.is_some() {
            "av-segmenter"
        } else {
            "video-monitor"
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, RecordingSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Poll until cancelled, rotating whenever the active file reaches the
    /// threshold. Hands itself back so the owner can close the last segment.
    pub(crate) fn run(mut self, stop: StopSignal) -> Self {
        let mut rotations = 0u32;

        while !stop.wait_timeout(self.poll_interval) {
            if self.camera_down {
                self.retry_camera();
                continue;
            }

            let Some(size) = self.active_size() else {
                continue;
            };

            if size >= self.threshold_bytes {
                debug!(size, threshold = self.threshold_bytes, "Segment threshold reached");
                self.rotate();
                rotations += 1;
            }
        }

        debug!(rotations, "Segmenter loop stopped");
        self
    }

    /// Point the camera at the segment that is waiting for it.
    fn retry_camera(&mut self) {
        let Some(path) = self
            .lock_session()
            .active_segment()
            .map(|segment| segment.video_path.clone())
        else {
            return;
        };

        match lock_camera(&self.camera).start_recording_to(&path) {
            Ok(()) => {
                self.camera_down = false;
                self.lock_session().restamp_active(Local::now());
                info!(path = ?path, "Camera recovered");
            }
            Err(e) => debug!(error = ?e, "Camera still unavailable"),
        }
    }

    fn active_size(&self) -> Option<u64> {
        let path = self.lock_session().active_segment()?.video_path.clone();
        fs::metadata(&path).ok().map(|m| m.len())
    }

    /// Close the active segment and open the next without leaving the
    /// session. Failures on the new segment degrade it instead of ending
    /// the session.
    pub(crate) fn rotate(&mut self) {
        {
            let mut session = self.lock_session();
            if session.state() == SessionState::Recording {
                session.set_state(SessionState::Rotating);
            }
        }

        self.close_active();

        if let Err(e) = self.open_video() {
            error!(error = ?e, "Failed to restart camera for next segment, retrying");
            self.camera_down = true;
        }
        if let Err(e) = self.start_audio() {
            warn!(error = ?e, "Audio span unavailable, next segment is video-only");
        }

        let mut session = self.lock_session();
        if session.state() == SessionState::Rotating {
            session.set_state(SessionState::Recording);
        }
    }

    /// Open a new segment and point the camera at its temp file. The segment
    /// stays open even if the camera fails.
    pub(crate) fn open_video(&mut self) -> CoreResult<()> {
        let (ordinal, path) = {
            let mut session = self.lock_session();
            let segment = session.open_segment(Local::now());
            (segment.ordinal, segment.video_path.clone())
        };

        lock_camera(&self.camera).start_recording_to(&path)?;
        info!(ordinal, path = ?path, "Segment opened");

        Ok(())
    }

    /// Start the paired audio span, if this is a combined session.
    pub(crate) fn start_audio(&self) -> CoreResult<()> {
        match &self.audio {
            Some(audio) => audio.start_segment(),
            None => Ok(()),
        }
    }

    /// Stop the camera (and audio span) and close the active segment. In
    /// combined mode the closed pair is queued for merging.
    pub(crate) fn close_active(&mut self) -> Option<Segment> {
        if let Err(e) = lock_camera(&self.camera).stop_recording() {
            warn!(error = ?e, "Camera failed to stop recording cleanly");
        }

        let audio_path = self.audio.as_ref().and_then(|audio| {
            audio
                .stop_segment()
                .map_err(|e| warn!(error = ?e, "Audio span did not flush"))
                .ok()
                .map(|segment| segment.path)
        });

        let (session_id, closed) = {
            let mut session = self.lock_session();
            (session.id(), session.close_active(Local::now(), audio_path)?)
        };

        info!(
            ordinal = closed.ordinal,
            path = ?closed.video_path,
            with_audio = closed.audio_path.is_some(),
            "Segment closed"
        );

        if !closed.video_path.exists() {
            warn!(ordinal = closed.ordinal, "Segment has no video, nothing to merge");
            return Some(closed);
        }

        if let (Some(queue), Some(audio), Some(ended_at)) =
            (&self.merges, closed.audio_path.clone(), closed.ended_at)
        {
            queue.submit(MergeRequest {
                session_id,
                chunk: closed.ordinal,
                video: closed.video_path.clone(),
                audio,
                started_at: closed.started_at,
                ended_at,
            });
        }

        Some(closed)
    }

    /// Close the last segment and wait for queued merges.
    pub(crate) fn finish(mut self, merge_timeout: Duration) -> CoreResult<MergeSummary> {
        self.close_active();

        match self.merges.take() {
            Some(queue) => queue.drain(merge_timeout),
            None => Ok(MergeSummary::default()),
        }
    }

    /// Undo a session start that failed part way: stop whatever did start
    /// and remove the empty temp file.
    pub(crate) fn abort(mut self) {
        if let Some(closed) = self.close_active() {
            if let Err(e) = fs::remove_file(&closed.video_path) {
                debug!(path = ?closed.video_path, error = %e, "No temp video to remove");
            }
        }
        if let Some(queue) = self.merges.take() {
            let _ = queue.drain(Duration::from_secs(1));
        }
    }
}

use crate::{CoreResult, merge::Muxer, naming};

use std::{fs, path::PathBuf, sync::Arc};

use chrono::{DateTime, Local};
use tracing::{info, instrument, warn};

/// One closed segment whose video and audio should become a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Session the segment belongs to.
    pub session_id: u64,
    /// Segment ordinal within the session.
    pub chunk: u32,
    /// Temp video file.
    pub video: PathBuf,
    /// Temp audio file of the paired span.
    pub audio: PathBuf,
    /// Segment start.
    pub started_at: DateTime<Local>,
    /// Segment end.
    pub ended_at: DateTime<Local>,
}

/// Turns (video, audio) pairs into merged segment files.
pub struct Merger {
    muxer: Arc<dyn Muxer>,
    output_dir: PathBuf,
}

impl Merger {
    /// Merge with `muxer`, writing outputs into `output_dir`.
    pub fn new(muxer: Arc<dyn Muxer>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            muxer,
            output_dir: output_dir.into(),
        }
    }

    /// Merge one segment.
    ///
    /// On success both inputs are deleted and the merged path is returned.
    /// On [`crate::CaptureError::MergeError`] both inputs are left on disk and
    /// the caller keeps the raw video as the deliverable.
    #[instrument(skip(self), fields(session_id = request.session_id, chunk = request.chunk))]
    pub fn merge(&self, request: &MergeRequest) -> CoreResult<PathBuf> {
        let output = self.output_dir.join(naming::merged_name(
            request.session_id,
            request.chunk,
            &request.started_at,
            &request.ended_at,
        ));

        self.muxer.mux(&request.video, &request.audio, &output)?;

        for input in [&request.video, &request.audio] {
            if let Err(e) = fs::remove_file(input) {
                warn!(path = ?input, error = %e, "Failed to remove merged input");
            }
        }

        info!(output = ?output, "Segment merged");

        Ok(output)
    }
}

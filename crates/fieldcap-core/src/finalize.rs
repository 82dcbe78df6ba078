//! Permanent naming of a stopped session's segments.

use crate::{
    CaptureError, naming,
    session::{CaptureMode, Segment, SegmentRecord},
};

use std::{fs, panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Result of finalizing one session.
#[derive(Debug, Default)]
pub struct FinalizeOutcome {
    /// One record per closed segment, in ordinal order.
    pub records: Vec<SegmentRecord>,
    /// Renames that failed; the matching records keep their previous path.
    pub failures: Vec<CaptureError>,
}

/// Renames segment deliverables to their permanent names.
pub struct SessionFinalizer {
    output_dir: PathBuf,
}

impl SessionFinalizer {
    /// Finalize into `output_dir`, which must already exist.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Rename every closed segment, in order.
    ///
    /// Position within the session is 1-based over the segments that produce
    /// a record. Skipped without a record:
    /// - active segments (the controller closes the last one first);
    /// - segments whose merge is still running;
    /// - segments the camera never wrote a file for.
    #[instrument(skip(self, segments), fields(segment_count = segments.len()))]
    pub fn finalize(
        &self,
        session_id: u64,
        mode: CaptureMode,
        segments: &mut [Segment],
        category: &str,
    ) -> FinalizeOutcome {
        let mut outcome = FinalizeOutcome::default();
        let mut position = 0u32;

        for segment in segments.iter_mut() {
            let Some(ended_at) = segment.ended_at else {
                warn!(ordinal = segment.ordinal, "Skipping active segment");
                continue;
            };
            if segment.merging {
                warn!(ordinal = segment.ordinal, "Merge still running, leaving segment in place");
                continue;
            }
            let current = segment.deliverable().to_path_buf();
            if !current.exists() {
                warn!(ordinal = segment.ordinal, path = ?current, "Segment has no file, dropping");
                continue;
            }
            position += 1;

            let target = self.output_dir.join(naming::final_name(
                mode.prefix(),
                session_id,
                position,
                &segment.started_at,
                &ended_at,
                category,
                naming::VIDEO_EXTENSION,
            ));

            let path = match fs::rename(&current, &target) {
                Ok(()) => {
                    segment.final_path = Some(target.clone());
                    target
                }
                Err(source) => {
                    warn!(
                        from = ?current,
                        to = ?target,
                        error = %source,
                        "Failed to finalize segment, keeping previous name"
                    );
                    outcome.failures.push(CaptureError::FinalizeError {
                        from: current.clone(),
                        to: target,
                        source,
                        location: ErrorLocation::from(Location::caller()),
                    });
                    current
                }
            };

            outcome.records.push(SegmentRecord {
                path,
                started_at: segment.started_at,
                ended_at,
            });
        }

        info!(
            session_id,
            finalized = outcome.records.len() - outcome.failures.len(),
            failed = outcome.failures.len(),
            "Session finalized"
        );

        outcome
    }
}

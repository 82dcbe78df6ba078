use std::time::Instant;

use uuid::Uuid;

/// Toggle state of one trigger (audio or video).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Not currently recording.
    Idle,
    /// A start command was delivered.
    Recording {
        /// When the start command was sent.
        started_at: Instant,
        /// Request ID for log correlation.
        request_id: Uuid,
    },
}

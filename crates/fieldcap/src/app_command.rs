use uuid::Uuid;

/// Commands sent from the trigger handler to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a standalone audio clip.
    StartAudio {
        /// Request ID shared by the matching stop.
        request_id: Uuid,
    },
    /// Stop the standalone audio clip.
    StopAudio {
        /// Request ID of the clip to stop.
        request_id: Uuid,
    },
    /// Start a segmented video session.
    StartVideo {
        /// Request ID shared by the matching stop.
        request_id: Uuid,
        /// Record paired audio and merge per segment.
        with_audio: bool,
    },
    /// Stop the video session and finalize its segments.
    StopVideo {
        /// Request ID of the session to stop.
        request_id: Uuid,
    },
    /// Capture one still image.
    CaptureImage {
        /// Request ID for log correlation.
        request_id: Uuid,
    },
    /// Stop everything and exit.
    Shutdown,
}

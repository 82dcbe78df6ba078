use std::{panic::Location, path::PathBuf, time::Duration};

use error_location::ErrorLocation;
use thiserror::Error;

/// Capture engine errors with source location tracking.
///
/// Only [`CaptureError::DeviceError`] is expected to reach callers of
/// `start_*` operations. The merge and finalize variants are produced as
/// values so the controller can pick a fallback instead of aborting.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Camera or audio device could not be opened or driven.
    #[error("Device error: {reason} {location}")]
    DeviceError {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The single audio input is already held by another capture span.
    #[error("Audio input already in use {location}")]
    AudioBusy {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A stop was requested but no matching capture span is running.
    #[error("No active capture to stop {location}")]
    NoActiveCapture {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The camera is recording video and cannot serve the request.
    #[error("Camera busy recording {location}")]
    CameraBusy {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// External muxer failed to combine a video and audio segment.
    #[error("Merge failed for {video:?}: {reason} {location}")]
    MergeError {
        /// Video input that was being merged.
        video: PathBuf,
        /// Description of the muxer failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Renaming a segment to its permanent name failed.
    #[error("Failed to finalize {from:?} as {to:?}: {source} {location}")]
    FinalizeError {
        /// Path the segment currently lives at.
        from: PathBuf,
        /// Permanent name that could not be applied.
        to: PathBuf,
        /// Underlying rename error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A background worker did not finish within its join budget.
    #[error("Worker '{worker}' did not stop within {timeout:?} {location}")]
    StopTimeout {
        /// Name of the worker thread.
        worker: String,
        /// Join budget that was exceeded.
        timeout: Duration,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A background worker exited without reporting a result.
    #[error("Worker '{worker}' terminated unexpectedly {location}")]
    WorkerPanicked {
        /// Name of the worker thread.
        worker: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the WAV container failed.
    #[error("WAV error: {source} {location}")]
    WavError {
        /// Underlying error from hound.
        #[source]
        source: hound::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CaptureError {
    /// Build a [`CaptureError::DeviceError`] at the caller's location.
    #[track_caller]
    pub fn device(reason: impl Into<String>) -> Self {
        CaptureError::DeviceError {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for CaptureError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CaptureError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<hound::Error> for CaptureError {
    #[track_caller]
    fn from(source: hound::Error) -> Self {
        CaptureError::WavError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CaptureError`].
pub type Result<T> = std::result::Result<T, CaptureError>;

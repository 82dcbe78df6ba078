//! Fieldcap Core Library
//!
//! Segmented media capture for a wearable camera: size-rotated video
//! segments, paired audio spans merged per segment, standalone audio clips,
//! and still images, all written under predictable names.
//!
//! # Example
//!
//! ```no_run
//! use fieldcap_core::{
//!     CaptureLayout, CoreResult, FfmpegMuxer, SegmentationConfig, SharedCaptureDevice,
//!     VideoSegmentationController, Indicator,
//! };
//!
//! use std::{path::Path, sync::Arc, thread::sleep, time::Duration};
//!
//! fn record(camera: SharedCaptureDevice, leds: Arc<dyn Indicator>) -> CoreResult<()> {
//!     let mut controller = VideoSegmentationController::new(
//!         SegmentationConfig::default(),
//!         CaptureLayout::under(Path::new("/home/pi/capture")),
//!         camera,
//!         None,
//!         Arc::new(FfmpegMuxer::locate()?),
//!         leds,
//!     );
//!
//!     controller.start_recording(false)?;
//!     sleep(Duration::from_secs(60));
//!     for record in controller.stop_recording("site visit")? {
//!         println!("{} {}-{}", record.path.display(), record.start_label(), record.end_label());
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod finalize;
mod indicator;
mod merge;
pub mod naming;
mod session;
mod video;
mod worker;

pub use {
    audio::{
        AudioCaptureEngine, AudioFormat, AudioInputSource, AudioInputStream, AudioRecording,
        AudioSegment, CpalInputSource,
    },
    error::{CaptureError, Result as CoreResult},
    finalize::{FinalizeOutcome, SessionFinalizer},
    indicator::{Indicator, STATUS_BLINK},
    merge::{FfmpegMuxer, MergeRequest, Merger, Muxer},
    session::{
        CaptureMode, RecordingSession, Segment, SegmentRecord, SessionSnapshot, SessionState,
    },
    video::{
        CaptureDevice, CaptureLayout, Resolution, SegmentationConfig, SharedCaptureDevice,
        Transform, VideoSegmentationController,
    },
    worker::{StopSignal, Worker},
};

#[cfg(test)]
mod tests;

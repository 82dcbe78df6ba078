use crate::CoreResult;

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

/// Capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// 1920x1080, used for video and preview.
    pub const FULL_HD: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };

    /// 3280x2464, the sensor's full still resolution.
    pub const FULL_SENSOR: Resolution = Resolution {
        width: 3280,
        height: 2464,
    };
}

/// Orientation applied by the camera pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transform {
    /// Mirror horizontally.
    pub hflip: bool,
    /// Mirror vertically.
    pub vflip: bool,
    /// Clockwise rotation in degrees.
    pub rotation: u16,
}

/// Camera driver the engine records through.
///
/// The device writes video files itself; the engine only tells it where.
/// Every method maps driver failures to [`crate::CaptureError::DeviceError`].
pub trait CaptureDevice: Send {
    /// Apply resolution and orientation for the next recording.
    fn configure(&mut self, resolution: Resolution, transform: Transform) -> CoreResult<()>;
    /// Start the sensor (preview / idle mode).
    fn start(&mut self) -> CoreResult<()>;
    /// Stop the sensor.
    fn stop(&mut self) -> CoreResult<()>;
    /// Begin encoding video into `path`, starting the sensor if needed.
    fn start_recording_to(&mut self, path: &Path) -> CoreResult<()>;
    /// Finish the current video file.
    fn stop_recording(&mut self) -> CoreResult<()>;
    /// Capture a single still image into `path`.
    fn capture_still(&mut self, resolution: Resolution, path: &Path) -> CoreResult<()>;
}

/// Camera shared between the controller and its background loop.
pub type SharedCaptureDevice = Arc<Mutex<dyn CaptureDevice>>;

pub(crate) fn lock_camera(
    camera: &SharedCaptureDevice,
) -> MutexGuard<'_, dyn CaptureDevice + 'static> {
    camera.lock().unwrap_or_else(|e| e.into_inner())
}

use fieldcap_core::{Resolution, Transform};
use serde::{Deserialize, Serialize};

/// Camera programs and image geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Video recorder executable.
    pub video_program: String,
    /// Still capture executable.
    pub still_program: String,
    /// Video width in pixels.
    pub width: u32,
    /// Video height in pixels.
    pub height: u32,
    /// Still width in pixels.
    pub still_width: u32,
    /// Still height in pixels.
    pub still_height: u32,
    /// Mirror horizontally.
    pub hflip: bool,
    /// Mirror vertically.
    pub vflip: bool,
    /// Rotation in degrees.
    pub rotation: u16,
}

impl CameraConfig {
    /// Video resolution.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Still resolution.
    pub fn still_resolution(&self) -> Resolution {
        Resolution {
            width: self.still_width,
            height: self.still_height,
        }
    }

    /// Orientation applied to recordings and stills.
    pub fn transform(&self) -> Transform {
        Transform {
            hflip: self.hflip,
            vflip: self.vflip,
            rotation: self.rotation,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            video_program: "rpicam-vid".to_string(),
            still_program: "rpicam-still".to_string(),
            width: Resolution::FULL_HD.width,
            height: Resolution::FULL_HD.height,
            still_width: Resolution::FULL_SENSOR.width,
            still_height: Resolution::FULL_SENSOR.height,
            hflip: true,
            vflip: false,
            rotation: 90,
        }
    }
}

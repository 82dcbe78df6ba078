use crate::config::{default_frames_per_read, default_sample_rate};

use fieldcap_core::AudioFormat;
use serde::{Deserialize, Serialize};

/// Audio capture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate written to clips.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Frames requested per blocking read.
    #[serde(default = "default_frames_per_read")]
    pub frames_per_read: usize,
}

impl AudioConfig {
    /// Mono 16-bit capture format at the configured rate.
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            frames_per_read: self.frames_per_read,
            ..AudioFormat::default()
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frames_per_read: default_frames_per_read(),
        }
    }
}

use crate::config::{default_category, default_true};

use serde::{Deserialize, Serialize};

/// Appliance behaviour configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Category embedded in every deliverable name.
    #[serde(default = "default_category")]
    pub category: String,
    /// Whether video sessions also record audio.
    #[serde(default = "default_true")]
    pub record_audio_with_video: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            category: default_category(),
            record_audio_with_video: true,
        }
    }
}

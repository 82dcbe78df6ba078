use crate::config::{
    default_join_timeout_ms, default_merge_timeout_ms, default_poll_interval_ms,
    default_threshold_bytes,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rotation and shutdown budgets for video sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationSettings {
    /// Active file size that triggers rotation.
    #[serde(default = "default_threshold_bytes")]
    pub threshold_bytes: u64,
    /// File size poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Budget for stopping a capture worker, in milliseconds.
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
    /// Budget for draining queued merges on stop, in milliseconds.
    #[serde(default = "default_merge_timeout_ms")]
    pub merge_timeout_ms: u64,
}

impl SegmentationSettings {
    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Worker join budget as a duration.
    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    /// Merge drain budget as a duration.
    pub fn merge_timeout(&self) -> Duration {
        Duration::from_millis(self.merge_timeout_ms)
    }
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            threshold_bytes: default_threshold_bytes(),
            poll_interval_ms: default_poll_interval_ms(),
            join_timeout_ms: default_join_timeout_ms(),
            merge_timeout_ms: default_merge_timeout_ms(),
        }
    }
}

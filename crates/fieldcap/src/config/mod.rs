mod audio_config;
mod behaviour_config;
mod camera_config;
#[allow(clippy::module_inception)]
mod config;
mod hardware_config;
mod logging_config;
mod muxer_config;
mod segmentation_config;
mod storage_config;

pub(crate) use {
    audio_config::AudioConfig,
    behaviour_config::BehaviourConfig,
    camera_config::CameraConfig,
    config::Config,
    hardware_config::{HardwareConfig, LedPins, TriggerAction},
    logging_config::LoggingConfig,
    muxer_config::MuxerConfig,
    segmentation_config::SegmentationSettings,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_CATEGORY: &str = "general";
pub(crate) const DEFAULT_THRESHOLD_BYTES: u64 = 50 * 1024 * 1024;
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub(crate) const DEFAULT_JOIN_TIMEOUT_MS: u64 = 10_000;
pub(crate) const DEFAULT_MERGE_TIMEOUT_MS: u64 = 300_000;
pub(crate) const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub(crate) const DEFAULT_FRAMES_PER_READ: usize = 1024;

pub(crate) fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_threshold_bytes() -> u64 {
    DEFAULT_THRESHOLD_BYTES
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_join_timeout_ms() -> u64 {
    DEFAULT_JOIN_TIMEOUT_MS
}

pub(crate) fn default_merge_timeout_ms() -> u64 {
    DEFAULT_MERGE_TIMEOUT_MS
}

pub(crate) fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

pub(crate) fn default_frames_per_read() -> usize {
    DEFAULT_FRAMES_PER_READ
}

//! Configuration management for fieldcap.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        AudioConfig, BehaviourConfig, CameraConfig, HardwareConfig, LoggingConfig, MuxerConfig,
        SegmentationSettings, StorageConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use fieldcap_core::SegmentationConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Working and output directories.
    pub storage: StorageConfig,
    /// Rotation threshold and shutdown budgets.
    #[serde(default)]
    pub segmentation: SegmentationSettings,
    /// Camera programs and geometry.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Audio capture format.
    #[serde(default)]
    pub audio: AudioConfig,
    /// External muxer.
    #[serde(default)]
    pub muxer: MuxerConfig,
    /// LED and button pin tables.
    #[serde(default)]
    pub hardware: HardwareConfig,
    /// Appliance behaviour.
    #[serde(default)]
    pub behaviour: BehaviourConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults with every directory under `root`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            storage: StorageConfig::under(root),
            segmentation: SegmentationSettings::default(),
            camera: CameraConfig::default(),
            audio: AudioConfig::default(),
            muxer: MuxerConfig::default(),
            hardware: HardwareConfig::default(),
            behaviour: BehaviourConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let dirs = Self::project_dirs()?;
        let config_dir = dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Self::with_root(dirs.data_dir());
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit path.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if power is cut during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Engine tuning derived from the segmentation and camera sections.
    pub fn segmentation_config(&self) -> SegmentationConfig {
        SegmentationConfig {
            threshold_bytes: self.segmentation.threshold_bytes,
            poll_interval: self.segmentation.poll_interval(),
            join_timeout: self.segmentation.join_timeout(),
            merge_timeout: self.segmentation.merge_timeout(),
            resolution: self.camera.resolution(),
            still_resolution: self.camera.still_resolution(),
            transform: self.camera.transform(),
        }
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "fieldcap", "Fieldcap").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Create every working directory the engine writes to.
    #[track_caller]
    pub fn ensure_directories(&self) -> AppResult<()> {
        let storage = &self.storage;
        let dirs: [&PathBuf; 4] = [
            &storage.audio_dir,
            &storage.video_dir,
            &storage.images_dir,
            &storage.output_dir,
        ];
        for dir in dirs {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

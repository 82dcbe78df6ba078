use std::path::{Path, PathBuf};

use fieldcap_core::CaptureLayout;
use serde::{Deserialize, Serialize};

/// Working and output directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Standalone clips and temp audio spans.
    pub audio_dir: PathBuf,
    /// Temp video segments and merge output.
    pub video_dir: PathBuf,
    /// Still images.
    pub images_dir: PathBuf,
    /// Finalized video segments.
    pub output_dir: PathBuf,
}

impl StorageConfig {
    /// `Audios/`, `Videos/` and `Images/` under `root`, finalizing in place.
    pub fn under(root: &Path) -> Self {
        Self {
            audio_dir: root.join("Audios"),
            video_dir: root.join("Videos"),
            images_dir: root.join("Images"),
            output_dir: root.join("Videos"),
        }
    }

    /// Directory layout for the video controller.
    pub fn layout(&self) -> CaptureLayout {
        CaptureLayout {
            video_dir: self.video_dir.clone(),
            output_dir: self.output_dir.clone(),
            images_dir: self.images_dir.clone(),
        }
    }
}

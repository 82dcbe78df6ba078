use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// External muxer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxerConfig {
    /// Explicit ffmpeg path (None = search the usual locations).
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Log output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily-rotated log files (None = stderr only).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

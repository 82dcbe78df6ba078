//! Tracing setup for the appliance.
//!
//! Always logs to stderr. When a log directory is configured, also writes a
//! daily-rotated file so a headless unit keeps a record between reboots.

use crate::{AppError, AppResult, config::LoggingConfig};

use std::{fs, panic::Location};

use error_location::ErrorLocation;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "fieldcap=debug,fieldcap_core=debug";
const LOG_FILE_PREFIX: &str = "fieldcap.log";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
#[track_caller]
pub fn init(config: &LoggingConfig) -> AppResult<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_names(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_thread_names(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::ConfigError {
            reason: format!("Failed to initialize logging: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if let Some(dir) = &config.directory {
        tracing::debug!(log_dir = ?dir, "File logging enabled");
    }

    Ok(guard)
}

//! Fieldcap: segmented video, audio and still capture for a wearable camera.

mod app;
mod app_command;
mod camera_device;
mod config;
mod error;
mod led_indicator;
mod logging;
mod recording_state;
#[cfg(test)]
mod tests;
mod trigger_handler;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    camera_device::CommandCaptureDevice,
    error::{AppError, Result as AppResult},
    led_indicator::LedIndicator,
    recording_state::RecordingState,
    trigger_handler::TriggerHandler,
};

use crate::config::{Config, LoggingConfig};

use std::sync::{Arc, Mutex as StdMutex};

use fieldcap_core::{
    AudioCaptureEngine, CpalInputSource, FfmpegMuxer, Indicator, SharedCaptureDevice,
    VideoSegmentationController,
};
use tokio::{
    io::BufReader,
    sync::{Mutex, mpsc, watch},
};
use tracing::{error, info};

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            // Logging is not configured yet; fall back to stderr only.
            let _guard = logging::init(&LoggingConfig::default());
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    // Held for the process lifetime so buffered file logs are flushed on exit.
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.ensure_directories() {
        error!("Failed to create capture directories: {:?}", e);
        std::process::exit(1);
    }

    let muxer = match &config.muxer.ffmpeg_path {
        Some(path) => FfmpegMuxer::new(path),
        None => match FfmpegMuxer::locate() {
            Ok(m) => m,
            Err(e) => {
                error!("Failed to locate ffmpeg: {:?}", e);
                std::process::exit(1);
            }
        },
    };
    info!(ffmpeg = ?muxer.program(), "Muxer ready");

    let leds: Arc<dyn Indicator> = Arc::new(LedIndicator::new(config.hardware.leds));
    let camera: SharedCaptureDevice =
        Arc::new(StdMutex::new(CommandCaptureDevice::new(&config.camera)));

    let audio = Arc::new(AudioCaptureEngine::new(
        Arc::new(CpalInputSource::new()),
        Arc::clone(&leds),
        config.storage.audio_dir.clone(),
        config.audio.format(),
        config.segmentation.join_timeout(),
    ));

    let controller = VideoSegmentationController::new(
        config.segmentation_config(),
        config.storage.layout(),
        camera,
        Some(Arc::clone(&audio)),
        Arc::new(muxer),
        leds,
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let trigger_handler = TriggerHandler::new(
            config.hardware.clone(),
            config.behaviour.record_audio_with_video,
            command_tx,
        );

        let app = App {
            controller: Arc::new(Mutex::new(controller)),
            audio,
            category: config.behaviour.category.clone(),
            command_rx,
            shutdown_tx,
        };

        tokio::join!(
            async move {
                let input = BufReader::new(tokio::io::stdin());
                if let Err(e) = trigger_handler.run(input, shutdown_rx).await {
                    error!(error = ?e, "Trigger handler error");
                }
                // Dropping the handler closes the command channel and stops the app.
                drop(trigger_handler);
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });
}

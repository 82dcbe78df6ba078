//! Trigger input handler with per-trigger toggle state.
//!
//! Reads one trigger per line from the GPIO service: either an action name
//! (`audio`, `video`, `image`, `shutdown`) or `pin <bcm>` resolved through the
//! configured button table. Audio and video toggle independently.

use crate::{
    AppCommand, AppError, AppResult, RecordingState,
    config::{HardwareConfig, TriggerAction},
};

use std::{panic::Location, time::Instant};

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::{Mutex, mpsc, watch},
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Maps trigger lines onto [`AppCommand`]s.
pub struct TriggerHandler {
    hardware: HardwareConfig,
    record_audio_with_video: bool,
    audio: Mutex<RecordingState>,
    video: Mutex<RecordingState>,
    command_tx: mpsc::Sender<AppCommand>,
}

impl TriggerHandler {
    /// Create a handler resolving pins through `hardware`.
    pub fn new(
        hardware: HardwareConfig,
        record_audio_with_video: bool,
        command_tx: mpsc::Sender<AppCommand>,
    ) -> Self {
        Self {
            hardware,
            record_audio_with_video,
            audio: Mutex::new(RecordingState::Idle),
            video: Mutex::new(RecordingState::Idle),
            command_tx,
        }
    }

    /// Resolve one input line to an action.
    pub fn parse_trigger(&self, line: &str) -> Option<TriggerAction> {
        let line = line.trim();
        match line.strip_prefix("pin") {
            Some(pin) => pin
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(|pin| self.hardware.action_for_pin(pin)),
            None => TriggerAction::from_name(&line.to_ascii_lowercase()),
        }
    }

    /// Current audio toggle state.
    #[cfg(test)]
    pub async fn audio_state(&self) -> RecordingState {
        *self.audio.lock().await
    }

    /// Current video toggle state.
    #[cfg(test)]
    pub async fn video_state(&self) -> RecordingState {
        *self.video.lock().await
    }

    /// Run until the input closes or a shutdown signal is received.
    #[instrument(skip_all)]
    pub async fn run<R>(&self, input: R, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Trigger handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Trigger input closed");
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match self.parse_trigger(&line) {
                        Some(action) => self.handle(action).await?,
                        None => warn!(line = %line.trim(), "Unknown trigger"),
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply one trigger press.
    #[instrument(skip(self))]
    pub async fn handle(&self, action: TriggerAction) -> AppResult<()> {
        match action {
            TriggerAction::ToggleAudio => {
                self.toggle(
                    &self.audio,
                    "audio",
                    |request_id| AppCommand::StartAudio { request_id },
                    |request_id| AppCommand::StopAudio { request_id },
                )
                .await
            }
            TriggerAction::ToggleVideo => {
                let with_audio = self.record_audio_with_video;
                self.toggle(
                    &self.video,
                    "video",
                    |request_id| AppCommand::StartVideo {
                        request_id,
                        with_audio,
                    },
                    |request_id| AppCommand::StopVideo { request_id },
                )
                .await
            }
            TriggerAction::CaptureImage => {
                let request_id = Uuid::new_v4();
                self.send(AppCommand::CaptureImage { request_id }).await?;
                debug!(request_id = %request_id, "Image requested");
                Ok(())
            }
            TriggerAction::Shutdown => self.send(AppCommand::Shutdown).await,
        }
    }

    async fn toggle(
        &self,
        state: &Mutex<RecordingState>,
        trigger: &'static str,
        start: impl FnOnce(Uuid) -> AppCommand,
        stop: impl FnOnce(Uuid) -> AppCommand,
    ) -> AppResult<()> {
        let mut state = state.lock().await;

        match *state {
            RecordingState::Idle => {
                let request_id = Uuid::new_v4();

                // Send first so a closed channel leaves the trigger Idle.
                self.send(start(request_id)).await?;

                *state = RecordingState::Recording {
                    started_at: Instant::now(),
                    request_id,
                };
                info!(trigger, request_id = %request_id, "Start requested");
            }
            RecordingState::Recording {
                started_at,
                request_id,
            } => {
                self.send(stop(request_id)).await?;

                *state = RecordingState::Idle;
                info!(
                    trigger,
                    request_id = %request_id,
                    duration_ms = started_at.elapsed().as_millis(),
                    "Stop requested"
                );
            }
        }

        Ok(())
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", e.0, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

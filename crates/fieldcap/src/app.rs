use crate::{AppCommand, AppError, AppResult};

use std::{panic::Location, path::PathBuf, sync::Arc};

use error_location::ErrorLocation;
use fieldcap_core::{
    AudioCaptureEngine, AudioRecording, CoreResult, SegmentRecord, VideoSegmentationController,
    naming,
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Main application state.
///
/// Engine calls block on devices, worker joins and ffmpeg, so each one runs
/// on the blocking pool while this loop keeps owning the command channel.
pub struct App {
    pub(crate) controller: Arc<Mutex<VideoSegmentationController>>,
    pub(crate) audio: Arc<AudioCaptureEngine>,
    pub(crate) category: String,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the command loop until shutdown or until every sender is gone.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Fieldcap starting");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AppCommand::StartAudio { request_id } => {
                    if let Err(e) = self.start_audio().await {
                        error!(request_id = %request_id, error = ?e, "Failed to start audio");
                    }
                }
                AppCommand::StopAudio { request_id } => match self.stop_audio().await {
                    Ok(recording) => log_audio(request_id, &recording),
                    Err(e) => error!(request_id = %request_id, error = ?e, "Failed to stop audio"),
                },
                AppCommand::StartVideo {
                    request_id,
                    with_audio,
                } => {
                    if let Err(e) = self.start_video(with_audio).await {
                        error!(request_id = %request_id, error = ?e, "Failed to start video");
                    }
                }
                AppCommand::StopVideo { request_id } => match self.stop_video().await {
                    Ok(records) => log_segments(request_id, &records),
                    Err(e) => error!(request_id = %request_id, error = ?e, "Failed to stop video"),
                },
                AppCommand::CaptureImage { request_id } => match self.capture_image().await {
                    Ok(path) => {
                        info!(request_id = %request_id, path = ?path, "Image ready for upload");
                    }
                    Err(e) => {
                        error!(request_id = %request_id, error = ?e, "Failed to capture image");
                    }
                },
                AppCommand::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        self.stop_all().await;

        let _ = self.shutdown_tx.send(true);
        info!("Fieldcap shut down successfully");

        Ok(())
    }

    async fn start_audio(&self) -> AppResult<()> {
        let audio = Arc::clone(&self.audio);
        blocking(move || audio.start_recording()).await
    }

    async fn stop_audio(&self) -> AppResult<AudioRecording> {
        let audio = Arc::clone(&self.audio);
        let category = self.category.clone();
        blocking(move || audio.stop_recording(&category)).await
    }

    async fn start_video(&self, with_audio: bool) -> AppResult<()> {
        let mut controller = Arc::clone(&self.controller).lock_owned().await;
        blocking(move || controller.start_recording(with_audio)).await
    }

    async fn stop_video(&self) -> AppResult<Vec<SegmentRecord>> {
        let mut controller = Arc::clone(&self.controller).lock_owned().await;
        let category = self.category.clone();
        blocking(move || controller.stop_recording(&category)).await
    }

    async fn capture_image(&self) -> AppResult<PathBuf> {
        let mut controller = Arc::clone(&self.controller).lock_owned().await;
        let category = self.category.clone();
        blocking(move || controller.capture_image(&category)).await
    }

    /// Close whatever is still recording so no capture is lost on exit.
    async fn stop_all(&self) {
        if self.controller.lock().await.is_recording() {
            match self.stop_video().await {
                Ok(records) => log_segments(Uuid::nil(), &records),
                Err(e) => error!(error = ?e, "Failed to stop video on shutdown"),
            }
        }

        if self.audio.is_capturing() {
            match self.stop_audio().await {
                Ok(recording) => log_audio(Uuid::nil(), &recording),
                Err(e) => warn!(error = ?e, "Failed to stop audio on shutdown"),
            }
        }
    }
}

/// Run a blocking engine call on the blocking pool.
async fn blocking<T, F>(task: F) -> AppResult<T>
where
    F: FnOnce() -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::TaskJoinFailed {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(result?)
}

fn log_audio(request_id: Uuid, recording: &AudioRecording) {
    info!(
        request_id = %request_id,
        path = ?recording.path,
        start = %naming::clock_label(&recording.started_at),
        end = %naming::clock_label(&recording.ended_at),
        "Audio ready for upload"
    );
}

fn log_segments(request_id: Uuid, records: &[SegmentRecord]) {
    info!(request_id = %request_id, segments = records.len(), "Video session finalized");
    for record in records {
        info!(
            request_id = %request_id,
            path = ?record.path,
            start = %record.start_label(),
            end = %record.end_label(),
            "Segment ready for upload"
        );
    }
}

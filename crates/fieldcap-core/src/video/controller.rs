use crate::{
    AudioCaptureEngine, CaptureError, CoreResult, Indicator, STATUS_BLINK,
    finalize::SessionFinalizer,
    merge::{Merger, Muxer},
    naming,
    session::{CaptureMode, RecordingSession, SegmentRecord, SessionSnapshot, SessionState},
    video::{
        device::{Resolution, SharedCaptureDevice, Transform, lock_camera},
        merge_queue::MergeQueue,
        segmenter::Segmenter,
    },
    worker::Worker,
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::Local;
use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};

/// Rotation and join tuning for the video controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentationConfig {
    /// Active file size that triggers rotation.
    pub threshold_bytes: u64,
    /// How often the active file size is checked.
    pub poll_interval: Duration,
    /// Budget for joining the segmenter on stop.
    pub join_timeout: Duration,
    /// Budget for draining queued merges on stop.
    pub merge_timeout: Duration,
    /// Video resolution.
    pub resolution: Resolution,
    /// Still image resolution.
    pub still_resolution: Resolution,
    /// Orientation applied before every session.
    pub transform: Transform,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: 50 * 1024 * 1024,
            poll_interval: Duration::from_secs(1),
            join_timeout: Duration::from_secs(10),
            merge_timeout: Duration::from_secs(300),
            resolution: Resolution::FULL_HD,
            still_resolution: Resolution::FULL_SENSOR,
            transform: Transform {
                hflip: true,
                vflip: false,
                rotation: 90,
            },
        }
    }
}

/// Where the controller keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureLayout {
    /// Temp video segments and merge output.
    pub video_dir: PathBuf,
    /// Finalized segments. Must exist before a session stops.
    pub output_dir: PathBuf,
    /// Still images.
    pub images_dir: PathBuf,
}

impl CaptureLayout {
    /// `Videos/` and `Images/` under `root`, finalizing in place.
    pub fn under(root: &Path) -> Self {
        let video_dir = root.join("Videos");
        Self {
            output_dir: video_dir.clone(),
            video_dir,
            images_dir: root.join("Images"),
        }
    }
}

struct ActiveRun {
    session: Arc<Mutex<RecordingSession>>,
    worker: Worker<Segmenter>,
}

/// Owns the camera for video sessions and still captures.
///
/// One session at a time. While a session runs, a background segmenter
/// rotates the output file whenever it reaches the size threshold; in
/// combined mode every segment gets its own audio span, and closed pairs are
/// merged on a separate worker while the next segment records.
pub struct VideoSegmentationController {
    config: SegmentationConfig,
    layout: CaptureLayout,
    camera: SharedCaptureDevice,
    audio: Option<Arc<AudioCaptureEngine>>,
    indicator: Arc<dyn Indicator>,
    merger: Arc<Merger>,
    finalizer: SessionFinalizer,
    active: Option<ActiveRun>,
    next_session_id: u64,
    next_image: u64,
}

impl VideoSegmentationController {
    /// Build a controller. Without an audio engine only video-only sessions
    /// can start.
    pub fn new(
        config: SegmentationConfig,
        layout: CaptureLayout,
        camera: SharedCaptureDevice,
        audio: Option<Arc<AudioCaptureEngine>>,
        muxer: Arc<dyn Muxer>,
        indicator: Arc<dyn Indicator>,
    ) -> Self {
        let merger = Arc::new(Merger::new(muxer, layout.video_dir.clone()));
        let finalizer = SessionFinalizer::new(layout.output_dir.clone());

        Self {
            config,
            layout,
            camera,
            audio,
            indicator,
            merger,
            finalizer,
            active: None,
            next_session_id: 1,
            next_image: 1,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match &self.active {
            Some(run) => run.session.lock().unwrap_or_else(|e| e.into_inner()).state(),
            None => SessionState::Idle,
        }
    }

    /// Whether a session is running.
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Copy of the running session, if any.
    pub fn session_snapshot(&self) -> Option<SessionSnapshot> {
        self.active.as_ref().map(|run| {
            run.session
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .snapshot()
        })
    }

    /// Start a session. Ignored while one is already running.
    ///
    /// # Errors
    ///
    /// [`CaptureError::DeviceError`] if the camera or (with audio) the audio
    /// input cannot be started. The controller stays idle and no segment
    /// file is left behind.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_recording(&mut self, with_audio: bool) -> CoreResult<()> {
        if self.active.is_some() {
            warn!("Recording already active, ignoring start");
            return Ok(());
        }

        let audio = match (with_audio, &self.audio) {
            (false, _) => None,
            (true, Some(audio)) => Some(Arc::clone(audio)),
            (true, None) => {
                return Err(CaptureError::DeviceError {
                    reason: "no audio input configured".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };
        let mode = if with_audio {
            CaptureMode::VideoWithAudio
        } else {
            CaptureMode::VideoOnly
        };

        fs::create_dir_all(&self.layout.video_dir)?;
        lock_camera(&self.camera).configure(self.config.resolution, self.config.transform)?;

        let session_id = self.next_session_id;
        let session = Arc::new(Mutex::new(RecordingSession::new(
            session_id,
            mode,
            self.layout.video_dir.clone(),
        )));

        let merges = match mode {
            CaptureMode::VideoWithAudio => Some(MergeQueue::spawn(
                Arc::clone(&self.merger),
                Arc::clone(&session),
            )?),
            CaptureMode::VideoOnly => None,
        };

        let mut segmenter = Segmenter::new(
            Arc::clone(&session),
            Arc::clone(&self.camera),
            audio,
            merges,
            self.config.threshold_bytes,
            self.config.poll_interval,
        );

        if let Err(e) = segmenter.open_video() {
            error!(error = ?e, "Failed to start video capture");
            segmenter.abort();
            return Err(e);
        }
        if let Err(e) = segmenter.start_audio() {
            error!(error = ?e, "Failed to start paired audio");
            segmenter.abort();
            return Err(e);
        }

        let name = segmenter.worker_name();
        let worker = match Worker::spawn(name, move |stop| segmenter.run(stop)) {
            Ok(worker) => worker,
            Err(e) => {
                // The segmenter moved into the failed spawn; stop the devices
                // directly.
                self.release_devices(&session, with_audio);
                return Err(e);
            }
        };

        self.indicator.record_on();
        self.next_session_id += 1;
        self.active = Some(ActiveRun { session, worker });
        info!(session_id, ?mode, "Recording started");

        Ok(())
    }

    /// Stop the session and return its finalized segments in order.
    ///
    /// Returns an empty list when idle. Merge and rename failures fall back
    /// to the raw or previous file and are only logged.
    ///
    /// # Errors
    ///
    /// [`CaptureError::StopTimeout`] if the segmenter does not stop within the
    /// join budget. The session is abandoned and the controller returns to
    /// idle.
    #[instrument(skip(self))]
    pub fn stop_recording(&mut self, category: &str) -> CoreResult<Vec<SegmentRecord>> {
        let Some(run) = self.active.take() else {
            info!("No recording active, nothing to stop");
            return Ok(Vec::new());
        };

        run.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .set_state(SessionState::Stopping);

        let segmenter = match run.worker.stop_and_join(self.config.join_timeout) {
            Ok(segmenter) => segmenter,
            Err(e) => {
                error!(error = ?e, "Segmenter did not stop, abandoning session");
                self.indicator.record_off();
                return Err(e);
            }
        };

        match segmenter.finish(self.config.merge_timeout) {
            Ok(summary) => info!(
                merged = summary.merged,
                merge_failures = summary.failed,
                "Background merges drained"
            ),
            Err(e) => warn!(error = ?e, "Merges did not drain, unmerged segments stay raw"),
        }

        if let Err(e) = lock_camera(&self.camera).start() {
            warn!(error = ?e, "Failed to return camera to preview");
        }
        self.indicator.record_off();

        // A merge worker that missed its drain budget may still hold the
        // session, so finalize from a copy of the segment list.
        let (session_id, mode, mut segments) = {
            let session = run.session.lock().unwrap_or_else(|e| e.into_inner());
            (session.id(), session.mode(), session.segments().to_vec())
        };
        let outcome = self
            .finalizer
            .finalize(session_id, mode, &mut segments, category);

        for failure in &outcome.failures {
            warn!(error = %failure, "Segment kept its previous name");
        }
        info!(
            session_id,
            segments = outcome.records.len(),
            "Recording stopped"
        );

        Ok(outcome.records)
    }

    /// Capture a still image into the images directory.
    ///
    /// # Errors
    ///
    /// [`CaptureError::CameraBusy`] while a video session runs;
    /// [`CaptureError::DeviceError`] if the camera fails.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn capture_image(&mut self, category: &str) -> CoreResult<PathBuf> {
        if self.active.is_some() {
            return Err(CaptureError::CameraBusy {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        fs::create_dir_all(&self.layout.images_dir)?;
        let path = self.layout.images_dir.join(naming::image_name(
            self.next_image,
            &Local::now(),
            category,
        ));

        lock_camera(&self.camera).capture_still(self.config.still_resolution, &path)?;
        self.next_image += 1;
        self.indicator.status_blink(STATUS_BLINK);
        info!(path = ?path, "Image captured");

        Ok(path)
    }

    fn release_devices(&self, session: &Arc<Mutex<RecordingSession>>, with_audio: bool) {
        if let Err(e) = lock_camera(&self.camera).stop_recording() {
            warn!(error = ?e, "Camera failed to stop recording cleanly");
        }
        if with_audio {
            if let Some(Err(e)) = self.audio.as_ref().map(|audio| audio.stop_segment()) {
                warn!(error = ?e, "Audio span did not flush");
            }
        }

        let active = session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .close_active(Local::now(), None);
        if let Some(segment) = active {
            let _ = fs::remove_file(&segment.video_path);
        }
    }
}

//! Audio capture spans on the single physical input.
//!
//! A span opens the device on a dedicated thread, reads fixed-size frames
//! until cancelled, releases the device and flushes the clip to a temp WAV.
//! Stopping a span joins that thread, so once `stop_*` returns the device is
//! closed and the file is complete.
//!
//! If the join times out the thread is left running with the device. The
//! claim it carries is only released when the stream is dropped, so no new
//! span can open the device until then.

use crate::{
    CaptureError, CoreResult, Indicator,
    audio::{AudioClip, AudioFormat, AudioInputSource, AudioInputStream},
    naming,
    worker::{StopSignal, Worker},
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc,
    },
    time::Duration,
};

use chrono::{DateTime, Local};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Pause after a failed read so a dead device does not spin the thread.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Finished standalone recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRecording {
    /// Final (or, if the rename failed, temp) path of the clip.
    pub path: PathBuf,
    /// Span start.
    pub started_at: DateTime<Local>,
    /// Span end.
    pub ended_at: DateTime<Local>,
}

/// Finished segment span, still under its temp name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    /// Temp WAV holding the span.
    pub path: PathBuf,
    /// Span start.
    pub started_at: DateTime<Local>,
    /// Span end.
    pub ended_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Standalone,
    Segment,
}

/// Held by the capture thread while it owns the input device.
struct DeviceClaim(Arc<AtomicBool>);

impl Drop for DeviceClaim {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct ActiveSpan {
    kind: SpanKind,
    temp_path: PathBuf,
    started_at: DateTime<Local>,
    worker: Worker<CoreResult<usize>>,
}

/// Records audio spans from one input device.
///
/// Shared between the appliance (standalone clips) and the video controller
/// (segment spans). At most one span is open at a time; that is what keeps
/// the physical device single-owner.
pub struct AudioCaptureEngine {
    source: Arc<dyn AudioInputSource>,
    indicator: Arc<dyn Indicator>,
    audio_dir: PathBuf,
    format: AudioFormat,
    join_timeout: Duration,
    span: Mutex<Option<ActiveSpan>>,
    device_claimed: Arc<AtomicBool>,
    span_counter: AtomicU64,
    clip_counter: AtomicU64,
}

impl AudioCaptureEngine {
    /// Build an engine writing clips and temp spans into `audio_dir`.
    pub fn new(
        source: Arc<dyn AudioInputSource>,
        indicator: Arc<dyn Indicator>,
        audio_dir: impl Into<PathBuf>,
        format: AudioFormat,
        join_timeout: Duration,
    ) -> Self {
        Self {
            source,
            indicator,
            audio_dir: audio_dir.into(),
            format,
            join_timeout,
            span: Mutex::new(None),
            device_claimed: Arc::new(AtomicBool::new(false)),
            span_counter: AtomicU64::new(1),
            clip_counter: AtomicU64::new(1),
        }
    }

    /// Directory temp and final clips are written to.
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Whether any span (standalone or segment) is open.
    pub fn is_capturing(&self) -> bool {
        self.lock_span().is_some()
    }

    /// Start a standalone recording. No-op if one is already running.
    ///
    /// # Errors
    ///
    /// [`CaptureError::DeviceError`] if the input cannot be opened; nothing is
    /// written and the audio indicator is left alone.
    /// [`CaptureError::AudioBusy`] if a segment span holds the device, or a
    /// previous span's thread has not released it yet.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_recording(&self) -> CoreResult<()> {
        let mut span = self.lock_span();
        match span.as_ref().map(|s| s.kind) {
            Some(SpanKind::Standalone) => {
                debug!("Audio recording already active, ignoring start");
                return Ok(());
            }
            Some(SpanKind::Segment) => {
                return Err(CaptureError::AudioBusy {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            None => {}
        }

        *span = Some(self.open_span(SpanKind::Standalone)?);
        self.indicator.audio_on();
        info!("Audio recording started");

        Ok(())
    }

    /// Stop the standalone recording and give it its permanent name.
    ///
    /// A failed rename is logged and the temp path is returned instead.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_recording(&self, category: &str) -> CoreResult<AudioRecording> {
        let (started_at, ended_at, temp_path) = self.close_span(SpanKind::Standalone)?;

        let clip = self.clip_counter.fetch_add(1, Ordering::Relaxed);
        let final_path = self.audio_dir.join(naming::final_name(
            naming::AUDIO_PREFIX,
            clip,
            1,
            &started_at,
            &ended_at,
            category,
            naming::AUDIO_EXTENSION,
        ));

        let path = match fs::rename(&temp_path, &final_path) {
            Ok(()) => final_path,
            Err(e) => {
                warn!(
                    temp_path = ?temp_path,
                    final_path = ?final_path,
                    error = %e,
                    "Failed to rename audio clip, keeping temp name"
                );
                temp_path
            }
        };

        info!(path = ?path, "Audio recording stopped");

        Ok(AudioRecording {
            path,
            started_at,
            ended_at,
        })
    }

    /// Start a segment span for combined video recording.
    ///
    /// # Errors
    ///
    /// [`CaptureError::AudioBusy`] while any span or a stalled capture thread
    /// holds the device; [`CaptureError::DeviceError`] if the input cannot be
    /// opened.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_segment(&self) -> CoreResult<()> {
        let mut span = self.lock_span();
        if span.is_some() {
            return Err(CaptureError::AudioBusy {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        *span = Some(self.open_span(SpanKind::Segment)?);
        self.indicator.audio_on();
        debug!("Audio segment started");

        Ok(())
    }

    /// Stop the segment span. The file keeps its temp name; the merge step
    /// decides what it becomes.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_segment(&self) -> CoreResult<AudioSegment> {
        let (started_at, ended_at, path) = self.close_span(SpanKind::Segment)?;
        debug!(path = ?path, "Audio segment stopped");

        Ok(AudioSegment {
            path,
            started_at,
            ended_at,
        })
    }

    fn lock_span(&self) -> MutexGuard<'_, Option<ActiveSpan>> {
        self.span.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn the capture thread and wait for it to report whether the device
    /// opened. Keeps the stream on the thread that reads it.
    #[track_caller]
    fn open_span(&self, kind: SpanKind) -> CoreResult<ActiveSpan> {
        if self.device_claimed.swap(true, Ordering::SeqCst) {
            warn!("Previous audio capture still holds the device");
            return Err(CaptureError::AudioBusy {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        let claim = DeviceClaim(Arc::clone(&self.device_claimed));

        fs::create_dir_all(&self.audio_dir)?;

        let span_id = self.span_counter.fetch_add(1, Ordering::Relaxed);
        let temp_path = self.audio_dir.join(naming::temp_audio_name(span_id, &Local::now()));

        let source = Arc::clone(&self.source);
        let format = self.format;
        let flush_path = temp_path.clone();
        let (opened_tx, opened_rx) = mpsc::sync_channel::<CoreResult<()>>(1);

        let worker = Worker::spawn("audio-capture", move |stop| {
            let stream = match source.open(&format) {
                Ok(stream) => {
                    let _ = opened_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = opened_tx.send(Err(e));
                    return Ok(0);
                }
            };
            run_capture(stream, claim, format, &stop, &flush_path)
        })?;

        match opened_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = ?e, "Failed to open audio input");
                let _ = worker.join(self.join_timeout);
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join(self.join_timeout);
                return Err(CaptureError::WorkerPanicked {
                    worker: "audio-capture".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        Ok(ActiveSpan {
            kind,
            temp_path,
            started_at: Local::now(),
            worker,
        })
    }

    #[track_caller]
    fn close_span(
        &self,
        kind: SpanKind,
    ) -> CoreResult<(DateTime<Local>, DateTime<Local>, PathBuf)> {
        let active = {
            let mut span = self.lock_span();
            match span.take() {
                Some(active) if active.kind == kind => active,
                other => {
                    *span = other;
                    return Err(CaptureError::NoActiveCapture {
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        };

        let flushed = active.worker.stop_and_join(self.join_timeout);
        let ended_at = Local::now().max(active.started_at + chrono::TimeDelta::milliseconds(1));
        self.indicator.audio_off();

        let samples = flushed??;
        debug!(samples, path = ?active.temp_path, "Audio span flushed");

        Ok((active.started_at, ended_at, active.temp_path))
    }
}

/// Capture loop body. The stream is dropped before flushing so the device
/// is free by the time the clip hits disk.
fn run_capture(
    mut stream: Box<dyn AudioInputStream>,
    claim: DeviceClaim,
    format: AudioFormat,
    stop: &StopSignal,
    path: &Path,
) -> CoreResult<usize> {
    let mut clip = AudioClip::new(format);
    let mut read_errors = 0u64;

    while !stop.is_stopped() {
        match stream.read(format.frames_per_read) {
            Ok(frames) => clip.extend(&frames),
            Err(e) => {
                read_errors += 1;
                warn!(error = %e, read_errors, "Audio read failed, continuing");
                stop.wait_timeout(READ_ERROR_BACKOFF);
            }
        }
    }

    match stream.finish() {
        Ok(tail) => clip.extend(&tail),
        Err(e) => warn!(error = %e, "Failed to drain audio tail"),
    }

    drop(stream);
    drop(claim);
    clip.flush_to(path)
}

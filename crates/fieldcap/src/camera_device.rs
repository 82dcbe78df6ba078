//! Camera adapter driving the `rpicam-*` command-line apps.
//!
//! Video runs as a long-lived `rpicam-vid` child writing straight to the
//! segment file. Stopping asks the app to quit through its keypress
//! interface so the container is closed properly, and only kills it if it
//! does not exit in time.

use crate::config::CameraConfig;

use std::{
    io::Write,
    path::Path,
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use fieldcap_core::{CaptureDevice, CaptureError, CoreResult, Resolution, Transform};
use tracing::{debug, info, instrument, warn};

/// How long a recorder gets to close its file before it is killed.
const STOP_GRACE: Duration = Duration::from_secs(3);
const EXIT_POLL: Duration = Duration::from_millis(20);

/// [`CaptureDevice`] backed by `rpicam-vid` and `rpicam-still`.
pub struct CommandCaptureDevice {
    video_program: String,
    still_program: String,
    resolution: Resolution,
    transform: Transform,
    recorder: Option<Child>,
    previewing: bool,
}

impl CommandCaptureDevice {
    /// Build from the camera section of the configuration.
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            video_program: config.video_program.clone(),
            still_program: config.still_program.clone(),
            resolution: config.resolution(),
            transform: config.transform(),
            recorder: None,
            previewing: false,
        }
    }

    pub(crate) fn geometry_args(resolution: Resolution, transform: Transform) -> Vec<String> {
        let mut args = vec![
            "--width".to_string(),
            resolution.width.to_string(),
            "--height".to_string(),
            resolution.height.to_string(),
        ];
        if transform.hflip {
            args.push("--hflip".to_string());
        }
        if transform.vflip {
            args.push("--vflip".to_string());
        }
        if transform.rotation != 0 {
            args.push("--rotation".to_string());
            args.push(transform.rotation.to_string());
        }
        args
    }

    #[track_caller]
    fn finish_recorder(&mut self) -> CoreResult<()> {
        let Some(mut child) = self.recorder.take() else {
            return Ok(());
        };

        // `x` + Enter quits rpicam apps started with --keypress.
        if let Some(Err(e)) = child.stdin.as_mut().map(|stdin| stdin.write_all(b"x\n")) {
            debug!(error = %e, "Recorder stdin closed");
        }

        let deadline = Instant::now() + STOP_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "Recorder exited");
                    return Ok(());
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
                Ok(None) => break,
                Err(e) => {
                    return Err(CaptureError::device(format!(
                        "Failed to poll recorder: {}",
                        e
                    )));
                }
            }
        }

        warn!(grace_ms = STOP_GRACE.as_millis(), "Recorder did not exit, killing");
        child
            .kill()
            .and_then(|()| child.wait().map(|_| ()))
            .map_err(|e| CaptureError::device(format!("Failed to kill recorder: {}", e)))
    }
}

impl CaptureDevice for CommandCaptureDevice {
    fn configure(&mut self, resolution: Resolution, transform: Transform) -> CoreResult<()> {
        self.resolution = resolution;
        self.transform = transform;
        debug!(?resolution, ?transform, "Camera configured");
        Ok(())
    }

    fn start(&mut self) -> CoreResult<()> {
        if !self.previewing {
            self.previewing = true;
            debug!("Camera in preview");
        }
        Ok(())
    }

    fn stop(&mut self) -> CoreResult<()> {
        self.previewing = false;
        self.finish_recorder()
    }

    #[instrument(skip(self))]
    fn start_recording_to(&mut self, path: &Path) -> CoreResult<()> {
        self.finish_recorder()?;

        let mut child = Command::new(&self.video_program)
            .args(["-t", "0", "-n", "--keypress"])
            .args(Self::geometry_args(self.resolution, self.transform))
            .arg("-o")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                CaptureError::device(format!("Failed to launch {}: {}", self.video_program, e))
            })?;

        // A recorder that dies immediately never had the camera.
        thread::sleep(EXIT_POLL);
        if let Ok(Some(status)) = child.try_wait() {
            return Err(CaptureError::device(format!(
                "{} exited at start with {}",
                self.video_program, status
            )));
        }

        self.recorder = Some(child);
        self.previewing = false;
        info!(path = ?path, "Camera recording");
        Ok(())
    }

    fn stop_recording(&mut self) -> CoreResult<()> {
        self.finish_recorder()
    }

    #[instrument(skip(self))]
    fn capture_still(&mut self, resolution: Resolution, path: &Path) -> CoreResult<()> {
        let output = Command::new(&self.still_program)
            .args(["-n", "-t", "1"])
            .args(Self::geometry_args(resolution, self.transform))
            .arg("-o")
            .arg(path)
            .output()
            .map_err(|e| {
                CaptureError::device(format!("Failed to launch {}: {}", self.still_program, e))
            })?;

        if !output.status.success() {
            return Err(CaptureError::device(format!(
                "{} exited with {}: {}",
                self.still_program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        debug!(path = ?path, "Still captured");
        Ok(())
    }
}

impl Drop for CommandCaptureDevice {
    fn drop(&mut self) {
        if let Err(e) = self.finish_recorder() {
            warn!(error = ?e, "Recorder left running on shutdown");
        }
    }
}

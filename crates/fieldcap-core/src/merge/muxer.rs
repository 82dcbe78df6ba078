//! External audio/video multiplexer.
//!
//! The merge contract is fixed: two inputs, video stream copied untouched,
//! audio encoded to AAC, output overwritten.

use crate::{CaptureError, CoreResult};

use std::{
    io,
    panic::Location,
    path::{Path, PathBuf},
    process::Command,
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Combines one video file and one audio file into a single container.
pub trait Muxer: Send + Sync {
    /// Write `output` from `video` and `audio`. A failure leaves both inputs
    /// untouched.
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> CoreResult<()>;
}

/// [`Muxer`] backed by an `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl FfmpegMuxer {
    /// Use `program` as the ffmpeg executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find ffmpeg in the usual install locations, then on `PATH`.
    #[track_caller]
    pub fn locate() -> CoreResult<Self> {
        Ok(Self::new(find_ffmpeg()?))
    }

    /// Executable this muxer invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Muxer for FfmpegMuxer {
    #[track_caller]
    #[instrument(skip(self))]
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> CoreResult<()> {
        let result = Command::new(&self.program)
            .arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .arg("-c:v")
            .arg("copy")
            .arg("-c:a")
            .arg("aac")
            .arg(output)
            .output();

        let output_status = result.map_err(|e| CaptureError::MergeError {
            video: video.to_path_buf(),
            reason: format!("Failed to launch {}: {}", self.program.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if output_status.status.success() {
            debug!(output = ?output, "ffmpeg merge complete");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            Err(CaptureError::MergeError {
                video: video.to_path_buf(),
                reason: format!("ffmpeg exited with {}: {}", output_status.status, stderr.trim()),
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}

/// Locate the ffmpeg binary, preferring standard Linux install paths.
#[track_caller]
fn find_ffmpeg() -> CoreResult<PathBuf> {
    let candidates = [
        PathBuf::from("/usr/bin/ffmpeg"),
        PathBuf::from("/usr/local/bin/ffmpeg"),
        PathBuf::from("/snap/bin/ffmpeg"),
    ];

    if let Some(path) = candidates.into_iter().find(|p| p.exists()) {
        debug!(path = ?path, "Found ffmpeg");
        return Ok(path);
    }

    let found = Command::new("which")
        .arg("ffmpeg")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| PathBuf::from(String::from_utf8_lossy(&out.stdout).trim()))
        .filter(|path| !path.as_os_str().is_empty());

    match found {
        Some(path) => {
            debug!(path = ?path, "Found ffmpeg in PATH");
            Ok(path)
        }
        None => Err(CaptureError::IoError {
            source: io::Error::new(
                io::ErrorKind::NotFound,
                "ffmpeg not found; install it with `apt install ffmpeg`",
            ),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

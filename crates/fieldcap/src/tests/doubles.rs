//! Minimal devices for driving the app without hardware.

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use fieldcap_core::{
    AudioFormat, AudioInputSource, AudioInputStream, CaptureDevice, CoreResult, Muxer,
    Resolution, SharedCaptureDevice, Transform,
};

/// Camera that writes a placeholder file for every recording and still.
pub struct FileCamera;

impl FileCamera {
    pub fn shared() -> SharedCaptureDevice {
        Arc::new(Mutex::new(FileCamera))
    }
}

impl CaptureDevice for FileCamera {
    fn configure(&mut self, _resolution: Resolution, _transform: Transform) -> CoreResult<()> {
        Ok(())
    }

    fn start(&mut self) -> CoreResult<()> {
        Ok(())
    }

    fn stop(&mut self) -> CoreResult<()> {
        Ok(())
    }

    fn start_recording_to(&mut self, path: &Path) -> CoreResult<()> {
        fs::write(path, b"h264")?;
        Ok(())
    }

    fn stop_recording(&mut self) -> CoreResult<()> {
        Ok(())
    }

    fn capture_still(&mut self, _resolution: Resolution, path: &Path) -> CoreResult<()> {
        fs::write(path, b"jpeg")?;
        Ok(())
    }
}

/// Audio input producing silence at a realistic pace.
pub struct SilentSource;

impl AudioInputSource for SilentSource {
    fn open(&self, _format: &AudioFormat) -> CoreResult<Box<dyn AudioInputStream>> {
        Ok(Box::new(SilentStream))
    }
}

struct SilentStream;

impl AudioInputStream for SilentStream {
    fn read(&mut self, frames: usize) -> CoreResult<Vec<i16>> {
        thread::sleep(Duration::from_millis(2));
        Ok(vec![0; frames])
    }
}

/// Muxer that writes the output without running ffmpeg.
pub struct TouchMuxer;

impl Muxer for TouchMuxer {
    fn mux(&self, _video: &Path, _audio: &Path, output: &Path) -> CoreResult<()> {
        fs::write(output, b"mp4")?;
        Ok(())
    }
}

/// Sorted file names in `dir` that start with `prefix`.
pub fn names_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}

//! Scripted stand-ins for the camera, audio input, muxer and LEDs.

use crate::{
    AudioFormat, AudioInputSource, AudioInputStream, CaptureDevice, CaptureError, CoreResult,
    Indicator, Muxer, Resolution, SharedCaptureDevice, Transform,
};

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

/// Poll `condition` until it holds or five seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Make `path` look like the camera wrote `bytes` to it (sparse on disk).
pub fn grow(path: &Path, bytes: u64) {
    OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_len(bytes)
        .unwrap();
}

/// File names in `dir`, sorted. Empty if the directory does not exist.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraCall {
    Configure(Resolution, Transform),
    Start,
    Stop,
    StartRecording(PathBuf),
    StopRecording,
    CaptureStill(Resolution, PathBuf),
}

#[derive(Default)]
pub struct CameraState {
    pub calls: Vec<CameraCall>,
    pub recording: Option<PathBuf>,
    pub fail_record: bool,
    pub stop_stall: Duration,
}

/// Camera that creates an empty file per recording and logs every call.
#[derive(Clone, Default)]
pub struct FakeCamera {
    state: Arc<Mutex<CameraState>>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_record() -> Self {
        let camera = Self::default();
        camera.state.lock().unwrap().fail_record = true;
        camera
    }

    /// Make later recording starts fail (or succeed again).
    pub fn set_fail_record(&self, fail: bool) {
        self.state.lock().unwrap().fail_record = fail;
    }

    /// Make every later `stop_recording` block for `stall`.
    pub fn set_stop_stall(&self, stall: Duration) {
        self.state.lock().unwrap().stop_stall = stall;
    }

    pub fn shared(&self) -> SharedCaptureDevice {
        Arc::new(Mutex::new(self.clone()))
    }

    pub fn calls(&self) -> Vec<CameraCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn recording_starts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CameraCall::StartRecording(_)))
            .count()
    }
}

impl CaptureDevice for FakeCamera {
    fn configure(&mut self, resolution: Resolution, transform: Transform) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CameraCall::Configure(resolution, transform));
        Ok(())
    }

    fn start(&mut self) -> CoreResult<()> {
        self.state.lock().unwrap().calls.push(CameraCall::Start);
        Ok(())
    }

    fn stop(&mut self) -> CoreResult<()> {
        self.state.lock().unwrap().calls.push(CameraCall::Stop);
        Ok(())
    }

    fn start_recording_to(&mut self, path: &Path) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_record {
            return Err(CaptureError::device("camera not detected"));
        }
        File::create(path)?;
        state.recording = Some(path.to_path_buf());
        state.calls.push(CameraCall::StartRecording(path.to_path_buf()));
        Ok(())
    }

    fn stop_recording(&mut self) -> CoreResult<()> {
        let stall = {
            let mut state = self.state.lock().unwrap();
            state.recording = None;
            state.calls.push(CameraCall::StopRecording);
            state.stop_stall
        };
        thread::sleep(stall);
        Ok(())
    }

    fn capture_still(&mut self, resolution: Resolution, path: &Path) -> CoreResult<()> {
        fs::write(path, b"jpeg")?;
        self.state
            .lock()
            .unwrap()
            .calls
            .push(CameraCall::CaptureStill(resolution, path.to_path_buf()));
        Ok(())
    }
}

/// Audio input that produces a constant tone and tracks how many streams
/// are open at once.
#[derive(Default)]
pub struct ScriptedSource {
    fail_open: AtomicBool,
    fail_alternate_reads: bool,
    read_delay_ms: Arc<AtomicU64>,
    opens: AtomicUsize,
    open_now: Arc<AtomicUsize>,
    max_open: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn flaky_reads() -> Self {
        Self {
            fail_alternate_reads: true,
            ..Self::default()
        }
    }

    /// Make later opens fail (or succeed again).
    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Extra time every read of every stream blocks for, ignoring stop.
    pub fn set_read_delay(&self, delay: Duration) {
        self.read_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    pub fn open_now(&self) -> usize {
        self.open_now.load(Ordering::SeqCst)
    }
}

impl AudioInputSource for ScriptedSource {
    fn open(&self, _format: &AudioFormat) -> CoreResult<Box<dyn AudioInputStream>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(CaptureError::device("no input device"));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        let now = self.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(ScriptedStream {
            open_now: Arc::clone(&self.open_now),
            read_delay_ms: Arc::clone(&self.read_delay_ms),
            fail_alternate_reads: self.fail_alternate_reads,
            reads: 0,
        }))
    }
}

struct ScriptedStream {
    open_now: Arc<AtomicUsize>,
    read_delay_ms: Arc<AtomicU64>,
    fail_alternate_reads: bool,
    reads: u64,
}

impl AudioInputStream for ScriptedStream {
    fn read(&mut self, frames: usize) -> CoreResult<Vec<i16>> {
        let extra = self.read_delay_ms.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2 + extra));
        self.reads += 1;
        if self.fail_alternate_reads && self.reads % 2 == 0 {
            return Err(CaptureError::device("overrun"));
        }
        Ok(vec![1000; frames])
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.open_now.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Muxer that writes a small output file, as if ffmpeg succeeded.
#[derive(Default)]
pub struct StubMuxer {
    pub calls: AtomicUsize,
}

impl Muxer for StubMuxer {
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> CoreResult<()> {
        assert!(video.exists(), "video input missing: {video:?}");
        assert!(audio.exists(), "audio input missing: {audio:?}");
        fs::write(output, b"merged")?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Muxer that takes `delay` per merge, like ffmpeg on a long segment.
pub struct SlowMuxer {
    delay: Duration,
    pub started: AtomicUsize,
    pub calls: AtomicUsize,
}

impl SlowMuxer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Muxer for SlowMuxer {
    fn mux(&self, _video: &Path, _audio: &Path, output: &Path) -> CoreResult<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        fs::write(output, b"merged")?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Muxer that always fails like a non-zero ffmpeg exit.
#[derive(Default)]
pub struct FailingMuxer {
    pub called: AtomicBool,
}

impl Muxer for FailingMuxer {
    fn mux(&self, video: &Path, _audio: &Path, _output: &Path) -> CoreResult<()> {
        self.called.store(true, Ordering::SeqCst);
        Err(CaptureError::MergeError {
            video: video.to_path_buf(),
            reason: "exit status: 1".to_string(),
            location: error_location::ErrorLocation::from(std::panic::Location::caller()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedEvent {
    RecordOn,
    RecordOff,
    AudioOn,
    AudioOff,
    StatusBlink(Duration),
}

/// Indicator that remembers every transition.
#[derive(Default)]
pub struct RecordingIndicator {
    events: Mutex<Vec<LedEvent>>,
}

impl RecordingIndicator {
    pub fn events(&self) -> Vec<LedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: LedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Indicator for RecordingIndicator {
    fn record_on(&self) {
        self.push(LedEvent::RecordOn);
    }

    fn record_off(&self) {
        self.push(LedEvent::RecordOff);
    }

    fn audio_on(&self) {
        self.push(LedEvent::AudioOn);
    }

    fn audio_off(&self) {
        self.push(LedEvent::AudioOff);
    }

    fn status_blink(&self, duration: Duration) {
        self.push(LedEvent::StatusBlink(duration));
    }
}

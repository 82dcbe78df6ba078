use crate::{
    AudioCaptureEngine, AudioFormat, CaptureError,
    tests::doubles::{LedEvent, RecordingIndicator, ScriptedSource, file_names, wait_until},
};

use std::{
    path::Path,
    sync::Arc,
    thread::sleep,
    time::Duration,
};

use hound::WavReader;
use tempfile::tempdir;

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);
const CAPTURE_TIME: Duration = Duration::from_millis(40);

fn engine(
    source: &Arc<ScriptedSource>,
    indicator: &Arc<RecordingIndicator>,
    dir: &Path,
) -> AudioCaptureEngine {
    AudioCaptureEngine::new(
        Arc::clone(source) as _,
        Arc::clone(indicator) as _,
        dir,
        AudioFormat::default(),
        JOIN_TIMEOUT,
    )
}

/// WHAT: A standalone recording is flushed and renamed with its category
/// WHY: The caller uploads the returned path as-is
#[test]
fn given_recording_when_stopping_then_final_wav_with_category() {
    // Given: A started standalone recording
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = engine(&source, &indicator, dir.path());
    engine.start_recording().unwrap();
    sleep(CAPTURE_TIME);

    // When: Stopping with a category
    let recording = engine.stop_recording("Field Notes").unwrap();

    // Then: One final WAV with samples, and the audio LED toggled once
    let name = recording.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("audio_1_1_"), "{name}");
    assert!(name.ends_with("_field_notes.wav"), "{name}");
    assert!(WavReader::open(&recording.path).unwrap().len() > 0);
    assert!(recording.ended_at > recording.started_at);
    assert_eq!(file_names(dir.path()), vec![name]);
    assert_eq!(indicator.events(), vec![LedEvent::AudioOn, LedEvent::AudioOff]);
    assert_eq!(source.open_now(), 0);
}

/// WHAT: Open failure reports DeviceError without side effects
/// WHY: A missing microphone must not leave files or lit LEDs behind
#[test]
fn given_open_failure_when_starting_then_device_error_no_file_no_indicator() {
    // Given: An input that cannot be opened
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::failing_open());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = engine(&source, &indicator, dir.path());

    // When: Starting a recording
    let result = engine.start_recording();

    // Then: DeviceError, no temp file, indicator untouched
    assert!(matches!(result, Err(CaptureError::DeviceError { .. })));
    assert!(file_names(dir.path()).is_empty());
    assert!(indicator.events().is_empty());
    assert!(!engine.is_capturing());
}

/// WHAT: A second start while recording is ignored
/// WHY: Only one span may hold the device
#[test]
fn given_active_recording_when_starting_again_then_no_second_open() {
    // Given: An active recording
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = engine(&source, &indicator, dir.path());
    engine.start_recording().unwrap();

    // When: Starting again
    let result = engine.start_recording();

    // Then: Accepted as a no-op, device opened once
    assert!(result.is_ok());
    assert_eq!(source.opens(), 1);
    engine.stop_recording("general").unwrap();
}

/// WHAT: Transient read errors do not end the span
/// WHY: No single data point is fatal mid-capture
#[test]
fn given_flaky_reads_when_recording_then_span_continues_and_flushes() {
    // Given: An input that fails every other read
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::flaky_reads());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = engine(&source, &indicator, dir.path());

    // When: Recording through the errors
    engine.start_recording().unwrap();
    sleep(CAPTURE_TIME);
    let recording = engine.stop_recording("general").unwrap();

    // Then: The good reads made it to disk
    assert!(WavReader::open(&recording.path).unwrap().len() > 0);
}

/// WHAT: Consecutive segment spans never hold the device at once
/// WHY: Concurrent opens fail on most audio backends
#[test]
fn given_segment_spans_when_cycling_then_device_opened_one_at_a_time() {
    // Given: An engine used for segment spans
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = engine(&source, &indicator, dir.path());

    // When: Running two spans back to back
    engine.start_segment().unwrap();
    sleep(CAPTURE_TIME);
    let first = engine.stop_segment().unwrap();
    engine.start_segment().unwrap();
    sleep(CAPTURE_TIME);
    let second = engine.stop_segment().unwrap();

    // Then: Two distinct temp files, never two open streams
    assert_ne!(first.path, second.path);
    assert!(first.path.exists() && second.path.exists());
    assert!(
        first
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("temp_audio_")
    );
    assert_eq!(source.opens(), 2);
    assert_eq!(source.max_open(), 1);
}

/// WHAT: Segment spans and standalone recordings exclude each other
/// WHY: Both draw on the single physical input
#[test]
fn given_standalone_recording_when_starting_segment_then_audio_busy() {
    // Given: A standalone recording in progress
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = engine(&source, &indicator, dir.path());
    engine.start_recording().unwrap();

    // When: A video session asks for a segment span
    let result = engine.start_segment();

    // Then: AudioBusy, and the standalone span is unaffected
    assert!(matches!(result, Err(CaptureError::AudioBusy { .. })));
    assert!(matches!(
        engine.stop_segment(),
        Err(CaptureError::NoActiveCapture { .. })
    ));
    assert!(engine.stop_recording("general").is_ok());
}

/// WHAT: Stopping without a span reports NoActiveCapture
/// WHY: Callers toggling state must learn nothing was running
#[test]
fn given_idle_engine_when_stopping_then_no_active_capture() {
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = engine(&source, &indicator, dir.path());

    assert!(matches!(
        engine.stop_recording("general"),
        Err(CaptureError::NoActiveCapture { .. })
    ));
}

/// WHAT: A span whose thread misses the join keeps the device claimed
/// WHY: Opening the input again while the old stream lives would double-open it
#[test]
fn given_stalled_stream_when_stop_times_out_then_restart_busy_until_released() {
    // Given: A segment span whose reads block far longer than the join budget
    let dir = tempdir().unwrap();
    let source = Arc::new(ScriptedSource::new());
    let indicator = Arc::new(RecordingIndicator::default());
    let engine = AudioCaptureEngine::new(
        Arc::clone(&source) as _,
        Arc::clone(&indicator) as _,
        dir.path(),
        AudioFormat::default(),
        Duration::from_millis(50),
    );
    engine.start_segment().unwrap();
    source.set_read_delay(Duration::from_millis(300));
    sleep(CAPTURE_TIME);

    // When: The stop times out and a new span is requested right away
    let stopped = engine.stop_segment();
    let restarted = engine.start_segment();

    // Then: Timeout, then busy, and the device was never opened twice
    assert!(matches!(stopped, Err(CaptureError::StopTimeout { .. })));
    assert!(matches!(restarted, Err(CaptureError::AudioBusy { .. })));
    assert!(!engine.is_capturing());
    assert_eq!(source.max_open(), 1);

    // When: The old thread finally lets go
    source.set_read_delay(Duration::ZERO);
    assert!(wait_until(|| engine.start_segment().is_ok()));

    // Then: The new span opens alone and stops normally
    assert_eq!(source.max_open(), 1);
    engine.stop_segment().unwrap();
    assert_eq!(source.open_now(), 0);
}

use crate::audio::Resampler;

// Test constants
const DEVICE_SAMPLE_RATE: u32 = 48_000;
const CAPTURE_SAMPLE_RATE: u32 = 44_100;
const ONE_SECOND_INPUT_SAMPLES: usize = DEVICE_SAMPLE_RATE as usize;
const ONE_SECOND_OUTPUT_SAMPLES: usize = CAPTURE_SAMPLE_RATE as usize;
const LENGTH_TOLERANCE: u64 = 2_500;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;
const CALLBACK_SAMPLES: usize = 480;

/// WHAT: One second at 48 kHz becomes roughly one second at 44.1 kHz
/// WHY: Devices that only offer 48 kHz must still yield the fixed capture rate
#[test]
fn given_48khz_audio_when_pushing_then_output_length_approximately_correct() {
    // Given: Resampler configured for 48kHz -> 44.1kHz
    let mut resampler = Resampler::new(DEVICE_SAMPLE_RATE, CAPTURE_SAMPLE_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; ONE_SECOND_INPUT_SAMPLES];

    // When: Pushing a full second
    let output = resampler.push(&input).unwrap();

    // Then: Output is about one second, minus what waits for the next chunk
    assert!(
        (output.len() as i64 - ONE_SECOND_OUTPUT_SAMPLES as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        ONE_SECOND_OUTPUT_SAMPLES,
        output.len()
    );
    assert!(output.iter().all(|&s| s.is_finite())); // No NaN/Inf
}

/// WHAT: Partial chunks are held back rather than padded
/// WHY: Padding every callback would inject silence mid-stream
#[test]
fn given_small_callbacks_when_pushing_then_output_arrives_once_chunk_fills() {
    // Given: Resampler and callback-sized input
    let mut resampler = Resampler::new(DEVICE_SAMPLE_RATE, CAPTURE_SAMPLE_RATE).unwrap();
    let callback = vec![TEST_SIGNAL_AMPLITUDE; CALLBACK_SAMPLES];

    // When: Pushing one small callback, then many
    let first = resampler.push(&callback).unwrap();
    let mut total = first.len();
    for _ in 0..99 {
        total += resampler.push(&callback).unwrap().len();
    }

    // Then: Nothing comes out for a partial chunk, output follows later
    assert!(first.is_empty());
    let expected = CALLBACK_SAMPLES * 100 * CAPTURE_SAMPLE_RATE as usize
        / DEVICE_SAMPLE_RATE as usize;
    assert!(
        (total as i64 - expected as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        expected,
        total
    );
}

/// WHAT: Empty input yields empty output
/// WHY: Edge case handling for zero-length callbacks
#[test]
fn given_empty_samples_when_pushing_then_empty_output() {
    let mut resampler = Resampler::new(DEVICE_SAMPLE_RATE, CAPTURE_SAMPLE_RATE).unwrap();
    assert!(resampler.push(&[]).unwrap().is_empty());
}

/// WHAT: Flushing resamples the held-back tail once
/// WHY: The end of every recording would otherwise be cut off
#[test]
fn given_partial_chunk_when_flushing_then_tail_emitted_once() {
    // Given: One callback, too short for a full chunk
    let mut resampler = Resampler::new(DEVICE_SAMPLE_RATE, CAPTURE_SAMPLE_RATE).unwrap();
    let callback = vec![TEST_SIGNAL_AMPLITUDE; CALLBACK_SAMPLES];
    assert!(resampler.push(&callback).unwrap().is_empty());

    // When: Flushing twice
    let tail = resampler.flush().unwrap();
    let again = resampler.flush().unwrap();

    // Then: The tail maps to the capture rate without padding, and only once
    let expected = CALLBACK_SAMPLES * CAPTURE_SAMPLE_RATE as usize / DEVICE_SAMPLE_RATE as usize;
    assert_eq!(tail.len(), expected);
    assert!(tail.iter().all(|&s| s.is_finite()));
    assert!(again.is_empty());
}

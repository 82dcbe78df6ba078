use crate::{AudioFormat, audio::AudioClip};

use hound::WavReader;
use tempfile::tempdir;

/// WHAT: Flushed clips are 16-bit mono 44.1 kHz WAV files
/// WHY: The merge step and downstream players expect the fixed format
#[test]
fn given_samples_when_flushing_then_wav_has_fixed_format() {
    // Given: A clip with one read's worth of frames
    let dir = tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    let mut clip = AudioClip::new(AudioFormat::default());
    clip.extend(&[100; 1024]);

    // When: Flushing to disk
    let written = clip.flush_to(&path).unwrap();

    // Then: Header and sample count match
    let reader = WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(written, 1024);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 1024);
}

/// WHAT: An empty clip still produces a valid file
/// WHY: A span stopped immediately must still give the merge an input
#[test]
fn given_empty_clip_when_flushing_then_valid_empty_wav() {
    // Given: A clip with no frames
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.wav");

    // When: Flushing
    let written = AudioClip::new(AudioFormat::default()).flush_to(&path).unwrap();

    // Then: The file opens and holds nothing
    assert_eq!(written, 0);
    assert_eq!(WavReader::open(&path).unwrap().len(), 0);
}

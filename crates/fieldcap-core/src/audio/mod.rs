mod clip;
mod cpal_input;
mod engine;
mod input;
mod resampler;

pub(crate) use {clip::AudioClip, resampler::Resampler};

pub use {
    cpal_input::CpalInputSource,
    engine::{AudioCaptureEngine, AudioRecording, AudioSegment},
    input::{AudioFormat, AudioInputSource, AudioInputStream},
};

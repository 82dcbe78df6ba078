use crate::{CoreResult, audio::AudioFormat};

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Frames accumulated during one capture span.
///
/// Lives only on the capture thread. [`AudioClip::flush_to`] consumes the
/// clip, so the buffer is released as soon as it is on disk.
pub struct AudioClip {
    format: AudioFormat,
    samples: Vec<i16>,
}

impl AudioClip {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            samples: Vec::new(),
        }
    }

    pub fn extend(&mut self, frames: &[i16]) {
        self.samples.extend_from_slice(frames);
    }

    /// Write the clip as a PCM WAV file. An empty clip still produces a
    /// valid (zero-length) file so downstream merge has an input.
    #[instrument(skip(self))]
    pub fn flush_to(self, path: &Path) -> CoreResult<usize> {
        let spec = WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: AudioFormat::BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        let duration_secs = self.samples.len() as f32
            / (self.format.sample_rate as f32 * f32::from(self.format.channels));
        debug!(
            sample_count = self.samples.len(),
            duration_secs,
            "Audio clip flushed"
        );

        Ok(self.samples.len())
    }
}

use crate::{CaptureError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Streaming mono resampler from the device rate to the capture rate.
///
/// Input is buffered until a full chunk is available; partial chunks wait
/// for the next push instead of being zero-padded, so no silence is injected
/// mid-stream. [`Resampler::flush`] pads the tail once when the stream ends.
pub struct Resampler {
    resampler: Fft<f32>,
    pending: Vec<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let chunk_size = 1024;
        let sub_chunks = 2;

        let resampler = Fft::<f32>::new(
            input_rate as usize,  // sample_rate_input
            output_rate as usize, // sample_rate_output
            chunk_size,           // chunk_size
            sub_chunks,           // sub_chunks
            1,                    // nbr_channels (mono)
            FixedSync::Input,     // fixed
        )
        .map_err(|e| CaptureError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, chunk_size, "Resampler initialized");

        Ok(Self {
            resampler,
            pending: Vec::with_capacity(chunk_size * 2),
            input_rate,
            output_rate,
        })
    }

    /// Feed device-rate samples, get back every capture-rate sample that
    /// complete chunks produced.
    #[track_caller]
    pub fn push(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        self.pending.extend_from_slice(samples);

        let mut output = Vec::new();
        loop {
            let chunk_size = self.resampler.input_frames_next();
            if self.pending.len() < chunk_size {
                break;
            }
            let input_chunk: Vec<f32> = self.pending.drain(..chunk_size).collect();
            output.extend(self.process_chunk(&input_chunk)?);
        }

        Ok(output)
    }

    /// Zero-pad and resample the samples still waiting for a full chunk.
    ///
    /// Output is cut to the length the real samples map to, so the padding
    /// never reaches the caller. Empty once nothing is pending.
    #[track_caller]
    pub fn flush(&mut self) -> CoreResult<Vec<f32>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let real = self.pending.len();
        let mut input_chunk: Vec<f32> = self.pending.drain(..).collect();
        input_chunk.resize(self.resampler.input_frames_next(), 0.0);

        let expected = (real as u64 * u64::from(self.output_rate)
            / u64::from(self.input_rate)) as usize;
        let mut output = self.process_chunk(&input_chunk)?;
        output.truncate(expected);

        debug!(pending = real, flushed = output.len(), "Resampler tail flushed");
        Ok(output)
    }

    #[track_caller]
    fn process_chunk(&mut self, input_chunk: &[f32]) -> CoreResult<Vec<f32>> {
        let chunk_size = input_chunk.len();
        let output_frames = self.resampler.output_frames_max();
        let mut output_chunk = vec![0.0f32; output_frames];

        let input_adapter =
            InterleavedSlice::new(input_chunk, 1, chunk_size).map_err(|e| {
                CaptureError::ResamplingError {
                    reason: format!("Failed to create input adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

        let mut output_adapter = InterleavedSlice::new_mut(&mut output_chunk, 1, output_frames)
            .map_err(|e| CaptureError::ResamplingError {
                reason: format!("Failed to create output adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (_input_frames, written) = self
            .resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| CaptureError::ResamplingError {
                reason: format!("Resampling failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        output_chunk.truncate(written);
        Ok(output_chunk)
    }
}

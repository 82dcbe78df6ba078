use crate::{
    CaptureError, CoreResult,
    audio::{AudioFormat, AudioInputSource, AudioInputStream, Resampler},
};

use std::{
    collections::VecDeque,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    time::Duration,
};

use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tracing::{debug, error, info, instrument};

/// How long a read waits for the device before reporting a transient error.
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Default system input opened through cpal.
///
/// The device is captured at its native configuration, downmixed to mono
/// and resampled to the requested rate, so callers always see the fixed
/// [`AudioFormat`].
#[derive(Debug, Default)]
pub struct CpalInputSource;

impl CpalInputSource {
    /// Use the host's default input device.
    pub fn new() -> Self {
        Self
    }
}

impl AudioInputSource for CpalInputSource {
    #[instrument(skip(self))]
    fn open(&self, format: &AudioFormat) -> CoreResult<Box<dyn AudioInputStream>> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| CaptureError::device("No audio input device found"))?;

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::device(format!("Failed to get config: {}", e)))?;

        let config: StreamConfig = supported.into();
        let device_rate = config.sample_rate;
        let device_channels = usize::from(config.channels.max(1));

        info!(
            device_id = ?device.id(),
            device_rate,
            device_channels,
            target_rate = format.sample_rate,
            "Opening audio input"
        );

        let resampler = if device_rate != format.sample_rate {
            Some(Resampler::new(device_rate, format.sample_rate)?)
        } else {
            None
        };

        let (tx, rx) = mpsc::channel::<Vec<f32>>();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Receiver gone means the span is closing.
                    let _ = tx.send(downmix(data, device_channels));
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CaptureError::device(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| CaptureError::device(format!("Failed to start stream: {}", e)))?;

        debug!("Audio input stream started");

        Ok(Box::new(CpalInputStream {
            _stream: stream,
            rx,
            resampler,
            ready: VecDeque::with_capacity(format.frames_per_read * 4),
        }))
    }
}

struct CpalInputStream {
    _stream: Stream,
    rx: Receiver<Vec<f32>>,
    resampler: Option<Resampler>,
    ready: VecDeque<i16>,
}

impl AudioInputStream for CpalInputStream {
    fn read(&mut self, frames: usize) -> CoreResult<Vec<i16>> {
        while self.ready.len() < frames {
            let chunk = match self.rx.recv_timeout(READ_TIMEOUT) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CaptureError::device(format!(
                        "No audio data within {:?}",
                        READ_TIMEOUT
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CaptureError::device("Audio stream closed"));
                }
            };

            let samples = match self.resampler.as_mut() {
                Some(resampler) => resampler.push(&chunk)?,
                None => chunk,
            };
            self.ready.extend(samples.into_iter().map(to_i16));
        }

        Ok(self.ready.drain(..frames).collect())
    }

    fn finish(&mut self) -> CoreResult<Vec<i16>> {
        while let Ok(chunk) = self.rx.try_recv() {
            let samples = match self.resampler.as_mut() {
                Some(resampler) => resampler.push(&chunk)?,
                None => chunk,
            };
            self.ready.extend(samples.into_iter().map(to_i16));
        }
        if let Some(resampler) = self.resampler.as_mut() {
            self.ready.extend(resampler.flush()?.into_iter().map(to_i16));
        }

        debug!(samples = self.ready.len(), "Audio input drained");
        Ok(self.ready.drain(..).collect())
    }
}

/// Average interleaved channels down to mono.
fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return data.to_vec();
    }
    data.chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

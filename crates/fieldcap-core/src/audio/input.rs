use crate::CoreResult;

/// Fixed capture format: mono, 16-bit, 44.1 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Samples per second delivered by [`AudioInputStream::read`].
    pub sample_rate: u32,
    /// Channel count of delivered frames.
    pub channels: u16,
    /// Frames requested per blocking read.
    pub frames_per_read: usize,
}

impl AudioFormat {
    /// Sample width written to disk.
    pub const BITS_PER_SAMPLE: u16 = 16;
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 1,
            frames_per_read: 1024,
        }
    }
}

/// Something that can open the physical audio input.
///
/// `open` is called on the capture thread, so the returned stream does not
/// need to be `Send`.
pub trait AudioInputSource: Send + Sync {
    /// Open the device in `format`. Failure here aborts the capture span.
    fn open(&self, format: &AudioFormat) -> CoreResult<Box<dyn AudioInputStream>>;
}

/// An open audio input. Dropping it releases the device.
pub trait AudioInputStream {
    /// Block until `frames` frames are available and return them.
    ///
    /// Errors are treated as transient by the capture loop.
    fn read(&mut self, frames: usize) -> CoreResult<Vec<i16>>;

    /// Hand back whatever is buffered but too short for a full read.
    /// Called once, after the last read and before the stream is dropped.
    fn finish(&mut self) -> CoreResult<Vec<i16>> {
        Ok(Vec::new())
    }
}

//! Indicator adapter for the status, audio and record LEDs.
//!
//! Pin driving belongs to the GPIO service; this adapter keeps the logical
//! LED levels and reports every transition with its pin from the injected
//! pin table.

use crate::config::LedPins;

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use fieldcap_core::Indicator;
use tracing::{debug, info};

/// Logical LED bank keyed by the configured pins.
pub struct LedIndicator {
    pins: LedPins,
    status: AtomicBool,
    audio: AtomicBool,
    record: AtomicBool,
}

impl LedIndicator {
    /// All LEDs off except status, which is lit while the camera is idle.
    pub fn new(pins: LedPins) -> Self {
        Self {
            pins,
            status: AtomicBool::new(true),
            audio: AtomicBool::new(false),
            record: AtomicBool::new(false),
        }
    }

    /// Current level of the status LED.
    #[cfg(test)]
    pub fn status_lit(&self) -> bool {
        self.status.load(Ordering::SeqCst)
    }

    /// Current level of the audio LED.
    #[cfg(test)]
    pub fn audio_lit(&self) -> bool {
        self.audio.load(Ordering::SeqCst)
    }

    /// Current level of the record LED.
    #[cfg(test)]
    pub fn record_lit(&self) -> bool {
        self.record.load(Ordering::SeqCst)
    }

    fn set(led: &AtomicBool, pin: u8, role: &'static str, lit: bool) {
        if led.swap(lit, Ordering::SeqCst) != lit {
            info!(pin, role, lit, "LED changed");
        }
    }
}

impl Indicator for LedIndicator {
    fn record_on(&self) {
        Self::set(&self.record, self.pins.record, "record", true);
    }

    fn record_off(&self) {
        Self::set(&self.record, self.pins.record, "record", false);
    }

    fn audio_on(&self) {
        Self::set(&self.audio, self.pins.audio, "audio", true);
    }

    fn audio_off(&self) {
        Self::set(&self.audio, self.pins.audio, "audio", false);
    }

    fn status_blink(&self, duration: Duration) {
        let before = self.status.fetch_xor(true, Ordering::SeqCst);
        debug!(pin = self.pins.status, duration_ms = duration.as_millis(), "Status blink");
        thread::sleep(duration);
        self.status.store(before, Ordering::SeqCst);
    }
}

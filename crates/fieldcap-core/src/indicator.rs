use std::time::Duration;

/// Default duration of a status blink after a still capture.
pub const STATUS_BLINK: Duration = Duration::from_millis(200);

/// Status LEDs driven by the engine at state transitions.
///
/// Implementations must not fail the capture path: an LED that cannot be
/// driven is the implementation's problem to log.
pub trait Indicator: Send + Sync {
    /// Record LED on (video session active).
    fn record_on(&self);
    /// Record LED off.
    fn record_off(&self);
    /// Audio LED on (audio capture span active).
    fn audio_on(&self);
    /// Audio LED off.
    fn audio_off(&self);
    /// Briefly invert the status LED.
    fn status_blink(&self, duration: Duration);
}

use serde::{Deserialize, Serialize};

/// What a trigger does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerAction {
    /// Start or stop a standalone audio clip.
    ToggleAudio,
    /// Start or stop a video session.
    ToggleVideo,
    /// Capture a still image.
    CaptureImage,
    /// Stop everything and exit.
    Shutdown,
}

impl TriggerAction {
    /// Parse the action name used on the trigger input.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "audio" | "toggle_audio" => Some(Self::ToggleAudio),
            "video" | "toggle_video" => Some(Self::ToggleVideo),
            "image" | "capture_image" => Some(Self::CaptureImage),
            "shutdown" => Some(Self::Shutdown),
            _ => None,
        }
    }
}

/// Electrical wiring of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    /// RF remote receiver output, active high.
    RfRemote,
    /// Physical button to ground, active low.
    Backup,
}

/// One button wired to a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBinding {
    /// BCM pin number.
    pub pin: u8,
    /// Wiring of the button.
    pub kind: ButtonKind,
    /// Action triggered on press.
    pub action: TriggerAction,
}

/// BCM pins of the status LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedPins {
    /// Camera status LED.
    pub status: u8,
    /// Audio recording LED.
    pub audio: u8,
    /// Video recording LED.
    pub record: u8,
}

impl Default for LedPins {
    fn default() -> Self {
        Self {
            status: 5,
            audio: 19,
            record: 26,
        }
    }
}

/// Pin tables for the LEDs and trigger buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// LED pins.
    pub leds: LedPins,
    /// Button bindings.
    pub buttons: Vec<ButtonBinding>,
}

impl HardwareConfig {
    /// Action bound to `pin`, if any.
    pub fn action_for_pin(&self, pin: u8) -> Option<TriggerAction> {
        self.buttons
            .iter()
            .find(|b| b.pin == pin)
            .map(|b| b.action)
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        use ButtonKind::{Backup, RfRemote};
        use TriggerAction::{CaptureImage, Shutdown, ToggleAudio, ToggleVideo};

        let binding = |pin, kind, action| ButtonBinding { pin, kind, action };

        Self {
            leds: LedPins::default(),
            buttons: vec![
                binding(22, RfRemote, ToggleAudio),
                binding(17, RfRemote, ToggleVideo),
                binding(23, RfRemote, CaptureImage),
                binding(27, RfRemote, Shutdown),
                binding(6, Backup, ToggleAudio),
                binding(13, Backup, ToggleVideo),
                binding(12, Backup, CaptureImage),
            ],
        }
    }
}

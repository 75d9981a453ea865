use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LED_PRIORITY: i32 = 10;
pub const DEFAULT_LED_BRIGHTNESS: u8 = 60;
pub const MAX_LED_BRIGHTNESS: u8 = 100;

/// Display mode of a tower LED panel. Modes the engine does not know about
/// are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LedMode {
    #[default]
    Time,
    Text,
    Preset,
    Off,
    Other(String),
}

impl From<String> for LedMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "time" => LedMode::Time,
            "text" => LedMode::Text,
            "preset" => LedMode::Preset,
            "off" => LedMode::Off,
            _ => LedMode::Other(value),
        }
    }
}

impl From<LedMode> for String {
    fn from(value: LedMode) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LedMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LedMode::Time => write!(f, "time"),
            LedMode::Text => write!(f, "text"),
            LedMode::Preset => write!(f, "preset"),
            LedMode::Off => write!(f, "off"),
            LedMode::Other(mode) => write!(f, "{mode}"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedState {
    #[cfg_attr(feature = "docs", schema(value_type = String))]
    pub mode: LedMode,
    pub preset: String,
    /// Upper-cased display text
    pub text: String,
    /// Informational only, the last applied command always wins
    pub priority: i32,
    /// Brightness percentage (0-100)
    pub brightness: u8,
    /// Requested display duration, 0 means indefinite
    pub duration_sec: u32,
    /// Expiry as Unix epoch milliseconds, 0 means no expiry
    pub until: i64,
}

impl Default for LedState {
    fn default() -> Self {
        Self {
            mode: LedMode::Time,
            preset: String::new(),
            text: String::new(),
            priority: DEFAULT_LED_PRIORITY,
            brightness: DEFAULT_LED_BRIGHTNESS,
            duration_sec: 0,
            until: 0,
        }
    }
}

impl LedState {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.until != 0 && now_ms >= self.until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_is_preserved() {
        let mode: LedMode = serde_json::from_str("\"scroll\"").unwrap();
        assert_eq!(mode, LedMode::Other("scroll".to_string()));
        assert_eq!(serde_json::to_string(&mode).unwrap(), "\"scroll\"");

        let mode: LedMode = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(mode, LedMode::Text);
    }

    #[test]
    fn test_expiry_boundaries() {
        let mut led = LedState::default();
        assert!(!led.is_expired(i64::MAX));

        led.until = 1_000;
        assert!(!led.is_expired(999));
        assert!(led.is_expired(1_000));
    }
}

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{DEFAULT_LED_BRIGHTNESS, DEFAULT_LED_PRIORITY, FleetStats, MAX_LED_BRIGHTNESS};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedTarget {
    /// Only the addressed tower
    #[default]
    Tower,
    /// Every tower in the addressed tower's region
    Region,
    /// The whole fleet
    All,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedRequest {
    /// Unknown targets address the tower only
    #[serde(default, deserialize_with = "lenient_target")]
    pub target: LedTarget,
    /// Display mode, required
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub preset: String,
    #[serde(default)]
    pub text: String,
    /// Seconds until expiry; negative reads as 0
    #[serde(default, deserialize_with = "lenient_duration")]
    pub duration_sec: u32,
    /// Clamped to 0..=100
    #[serde(default = "default_brightness", deserialize_with = "lenient_brightness")]
    pub brightness: u8,
    #[serde(default = "default_priority", deserialize_with = "lenient_priority")]
    pub priority: i32,
}

impl LedRequest {
    /// Device command body for this request, `None` when no mode was given.
    pub fn command_body(&self) -> Option<LedCommandBody> {
        let mode = self.mode.as_deref().filter(|mode| !mode.is_empty())?;

        Some(LedCommandBody {
            mode: mode.to_string(),
            preset: self.preset.clone(),
            text: self.text.clone(),
            duration_sec: self.duration_sec,
            brightness: self.brightness,
            priority: self.priority,
        })
    }
}

/// Payload published on `cmd/led` topics.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedCommandBody {
    pub mode: String,
    pub preset: String,
    pub text: String,
    pub duration_sec: u32,
    pub brightness: u8,
    pub priority: i32,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedResponse {
    /// Ids of every tower the command was applied to
    pub updated: Vec<String>,
    pub stats: FleetStats,
}

fn default_brightness() -> u8 {
    DEFAULT_LED_BRIGHTNESS
}

fn default_priority() -> i32 {
    DEFAULT_LED_PRIORITY
}

/// Any JSON value, keeping only what a numeric or string field can use.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    fn number(self) -> Option<f64> {
        match self {
            Loose::Number(n) => Some(n),
            Loose::Text(s) => s.trim().parse::<f64>().ok(),
            Loose::Other(_) => None,
        }
        .filter(|n| n.is_finite())
    }
}

fn lenient_target<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LedTarget, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(target) => match target.to_ascii_lowercase().as_str() {
            "region" => LedTarget::Region,
            "all" => LedTarget::All,
            _ => LedTarget::Tower,
        },
        _ => LedTarget::Tower,
    })
}

fn lenient_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Loose::deserialize(deserializer)?
        .number()
        .map_or(0, |n| n.trunc().clamp(0.0, f64::from(u32::MAX)) as u32))
}

fn lenient_brightness<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(Loose::deserialize(deserializer)?
        .number()
        .map_or(DEFAULT_LED_BRIGHTNESS, |n| {
            n.round().clamp(0.0, f64::from(MAX_LED_BRIGHTNESS)) as u8
        }))
}

fn lenient_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(Loose::deserialize(deserializer)?
        .number()
        .map_or(DEFAULT_LED_PRIORITY, |n| {
            n.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
        }))
}

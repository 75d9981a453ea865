use towerwatch_api::restful::LedRequest;
use towerwatch_api::{DEFAULT_LED_BRIGHTNESS, DEFAULT_LED_PRIORITY, LedMode, LedState, MAX_LED_BRIGHTNESS, Tower};

use crate::services::DeviceRegistry;

pub const MAX_BRIGHTNESS: u8 = MAX_LED_BRIGHTNESS;

/// A validated LED command. Constructed only with a non-empty mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedCommand {
    pub mode: LedMode,
    pub preset: String,
    pub text: String,
    pub priority: i32,
    pub brightness: u8,
    pub duration_sec: u32,
}

impl LedCommand {
    pub fn new(mode: LedMode) -> Self {
        Self {
            mode,
            preset: String::new(),
            text: String::new(),
            priority: DEFAULT_LED_PRIORITY,
            brightness: DEFAULT_LED_BRIGHTNESS,
            duration_sec: 0,
        }
    }

    pub fn from_request(request: &LedRequest) -> Option<Self> {
        let body = request.command_body()?;

        Some(Self {
            mode: LedMode::from(body.mode),
            preset: body.preset,
            text: body.text,
            priority: body.priority,
            brightness: body.brightness.min(MAX_BRIGHTNESS),
            duration_sec: body.duration_sec,
        })
    }

    /// The LED state this command produces when applied at `now_ms`.
    pub fn state_at(&self, now_ms: i64) -> LedState {
        let until = if self.duration_sec > 0 {
            now_ms + i64::from(self.duration_sec) * 1000
        } else {
            0
        };

        LedState {
            mode: self.mode.clone(),
            preset: self.preset.clone(),
            text: self.text.to_uppercase(),
            priority: self.priority,
            brightness: self.brightness,
            duration_sec: self.duration_sec,
            until,
        }
    }
}

/// Replaces the tower's whole LED state. Priorities are never compared.
pub fn apply(tower: &mut Tower, command: &LedCommand, now_ms: i64) {
    tower.led = command.state_at(now_ms);
}

/// Resets every expired LED to the default state and returns the changed
/// towers. Towers without an expiry are never touched, so repeated sweeps
/// report each expiry once.
pub fn sweep(registry: &mut DeviceRegistry, now_ms: i64) -> Vec<Tower> {
    let mut changed = Vec::new();

    for tower in registry.towers_mut() {
        if tower.led.is_expired(now_ms) {
            tower.led = LedState::default();
            changed.push(tower.clone());
        }
    }

    changed
}

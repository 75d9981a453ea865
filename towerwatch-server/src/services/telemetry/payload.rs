use serde_json::{Map, Value};
use towerwatch_api::{IO_LINES, IoLines, LedMode};

use crate::errors::IngestError;
use crate::services::led_service::{LedCommand, MAX_BRIGHTNESS};
use crate::services::telemetry::EventKind;

const MIN_SIGNAL: f64 = 1.0;
const MAX_SIGNAL: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub online: bool,
    /// Only present when the payload carried a number
    pub signal: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IoReport {
    pub inputs: Option<IoLines>,
    pub outputs: Option<IoLines>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallReport {
    /// `None` when the index is not a non-negative integer
    pub input: Option<usize>,
    pub state: u8,
}

/// Telemetry normalized to the value ranges the registry stores.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    Status(StatusReport),
    Io(IoReport),
    Call(CallReport),
    /// `None` when the payload had no usable mode
    Led(Option<LedCommand>),
}

impl TelemetryEvent {
    pub fn parse(kind: EventKind, payload: &[u8]) -> Result<Self, IngestError> {
        let value: Value = if payload.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice(payload)?
        };

        let Value::Object(data) = value else {
            return Err(IngestError::NotAnObject);
        };

        Ok(match kind {
            EventKind::Status => TelemetryEvent::Status(StatusReport {
                online: data.get("online").is_some_and(truthy),
                signal: match data.get("signal") {
                    Some(Value::Number(n)) => n
                        .as_f64()
                        .map(|signal| signal.round().clamp(MIN_SIGNAL, MAX_SIGNAL) as u8),
                    _ => None,
                },
            }),
            EventKind::Io => TelemetryEvent::Io(IoReport {
                inputs: data.get("inputs").and_then(lines),
                outputs: data.get("outputs").and_then(lines),
            }),
            EventKind::Call => TelemetryEvent::Call(CallReport {
                input: match data.get("input") {
                    None | Some(Value::Null) => Some(0),
                    Some(value) => number(value)
                        .filter(|index| index.fract() == 0.0 && *index >= 0.0)
                        .map(|index| index as usize),
                },
                state: u8::from(data.get("state").is_some_and(truthy)),
            }),
            EventKind::Led => TelemetryEvent::Led(led_command(&data)),
        })
    }
}

fn led_command(data: &Map<String, Value>) -> Option<LedCommand> {
    let mode = data
        .get("mode")
        .and_then(Value::as_str)
        .filter(|mode| !mode.is_empty())?;

    let mut command = LedCommand::new(LedMode::from(mode.to_string()));

    if let Some(preset) = data.get("preset").and_then(Value::as_str) {
        command.preset = preset.to_string();
    }
    if let Some(text) = data.get("text").and_then(Value::as_str) {
        command.text = text.to_string();
    }
    if let Some(priority) = data.get("priority").and_then(number) {
        command.priority = priority.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
    }
    if let Some(brightness) = data.get("brightness").and_then(number) {
        command.brightness = brightness.round().clamp(0.0, f64::from(MAX_BRIGHTNESS)) as u8;
    }
    if let Some(duration) = data.get("durationSec").and_then(number) {
        command.duration_sec = duration.trunc().clamp(0.0, f64::from(u32::MAX)) as u32;
    }

    Some(command)
}

/// Truncates or pads to exactly [`IO_LINES`] entries, each coerced to 0/1.
fn lines(value: &Value) -> Option<IoLines> {
    let Value::Array(items) = value else {
        return None;
    };

    let mut lines = [0; IO_LINES];
    for (line, item) in lines.iter_mut().zip(items) {
        *line = u8::from(truthy(item));
    }

    Some(lines)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

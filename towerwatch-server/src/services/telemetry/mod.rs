//! Inbound telemetry: topic and payload validation, then the mutation each
//! validated event applies to its tower.

mod payload;
mod topic;

pub use payload::*;
pub use topic::*;

use towerwatch_api::{IO_LINES, LogKind, Tower};

use crate::services::led_service;

/// Result of offering one telemetry message to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The tower was mutated, logged and broadcast
    Applied { tower: String },
    /// Valid event that requested no change
    Ignored,
    /// Topic is not a telemetry topic
    UnknownTopic,
    /// No tower resolved for the topic id
    UnknownTower,
    /// Payload failed validation and was logged as an error
    Rejected { reason: String },
}

/// Applies a validated event, returning the log line describing it, or
/// `None` when the event leaves the tower untouched.
pub fn apply_event(tower: &mut Tower, event: &TelemetryEvent, now_ms: i64) -> Option<(LogKind, String)> {
    match event {
        TelemetryEvent::Status(report) => {
            tower.online = report.online;
            if let Some(signal) = report.signal {
                tower.signal = signal;
            }

            Some((
                LogKind::Mqtt,
                format!("Status update {} online={} signal={}", tower.id, tower.online, tower.signal),
            ))
        }
        TelemetryEvent::Io(report) => {
            if report.inputs.is_none() && report.outputs.is_none() {
                return None;
            }
            if let Some(inputs) = report.inputs {
                tower.inputs = inputs;
            }
            if let Some(outputs) = report.outputs {
                tower.outputs = outputs;
            }

            Some((LogKind::Mqtt, format!("IO update {}", tower.id)))
        }
        TelemetryEvent::Call(report) => {
            let index = report.input.filter(|&index| index < IO_LINES)?;
            tower.inputs[index] = report.state;

            Some((
                LogKind::Alarm,
                format!("Call input{}={} {}", index + 1, report.state, tower.id),
            ))
        }
        TelemetryEvent::Led(command) => {
            let command = command.as_ref()?;
            led_service::apply(tower, command, now_ms);

            Some((
                LogKind::Led,
                format!("LED state from MQTT {} mode={}", tower.id, command.mode),
            ))
        }
    }
}

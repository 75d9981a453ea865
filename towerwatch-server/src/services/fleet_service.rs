use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use towerwatch_api::restful::{AckResponse, LedRequest, LedResponse, LedTarget, TowerResponse};
use towerwatch_api::{FleetSnapshot, IO_LINES, LogKind, Tower, topics};

use crate::configs::Fleet;
use crate::errors::TowerError;
use crate::services::alarm_service::{self, PendingClear};
use crate::services::broadcast_service::{BroadcastHub, LogBook, Observer};
use crate::services::led_service::{self, LedCommand};
use crate::services::telemetry::{self, IngestOutcome, TelemetryEvent, TelemetryTopic};
use crate::services::{DeviceRegistry, Simulator};

/// Outbound message toward a tower or group of towers.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCommand {
    pub topic: String,
    pub payload: Value,
}

/// Owner of all fleet state.
///
/// Every mutation goes through a method here and is followed by a broadcast
/// of the affected towers before the method returns.
pub struct FleetEngine {
    registry: DeviceRegistry,
    logs: LogBook,
    hub: BroadcastHub,
    simulator: Simulator,
    outbox: Option<mpsc::UnboundedSender<DeviceCommand>>,
    snapshot_logs: usize,
}

impl FleetEngine {
    pub fn new(registry: DeviceRegistry, fleet: &Fleet, simulator: Simulator) -> Self {
        Self {
            registry,
            logs: LogBook::new(fleet.log_capacity),
            hub: BroadcastHub::new(fleet.broadcast_capacity),
            simulator,
            outbox: None,
            snapshot_logs: fleet.snapshot_logs,
        }
    }

    /// Routes device commands to `outbox`. Without one they are dropped.
    pub fn with_outbox(mut self, outbox: mpsc::UnboundedSender<DeviceCommand>) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn logs(&self) -> &LogBook {
        &self.logs
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            towers: self.registry.towers().to_vec(),
            regions: self.registry.regions().to_vec(),
            stats: self.registry.stats(),
            logs: self.logs.recent(self.snapshot_logs),
        }
    }

    pub fn subscribe(&self) -> Observer {
        self.hub.subscribe(self.snapshot())
    }

    pub fn log(&mut self, kind: LogKind, msg: impl Into<String>) {
        let entry = self.logs.append(kind, msg);
        self.hub.publish_log(entry);
    }

    /// Validates one telemetry message and applies it to its tower.
    pub fn ingest(&mut self, topic: &str, payload: &[u8], now_ms: i64) -> IngestOutcome {
        let Some(parsed) = TelemetryTopic::parse(topic) else {
            tracing::debug!("Ignoring message on {}", topic);
            return IngestOutcome::UnknownTopic;
        };

        let Some(index) = self.registry.resolve(&parsed.tower) else {
            tracing::debug!("No tower matches {} ({})", parsed.tower, parsed.kind);
            return IngestOutcome::UnknownTower;
        };

        let event = match TelemetryEvent::parse(parsed.kind, payload) {
            Ok(event) => event,
            Err(e) => {
                let reason = e.to_string();
                self.log(LogKind::Error, format!("Bad payload on {topic}: {reason}"));
                return IngestOutcome::Rejected { reason };
            }
        };

        let Some(tower) = self.registry.tower_at_mut(index) else {
            return IngestOutcome::UnknownTower;
        };
        let Some((kind, message)) = telemetry::apply_event(tower, &event, now_ms) else {
            return IngestOutcome::Ignored;
        };
        let tower = tower.clone();

        self.log(kind, message);
        let id = tower.id.clone();
        self.broadcast_tower(tower);

        IngestOutcome::Applied { tower: id }
    }

    /// Expires time-bounded LED states, returning how many were reset.
    pub fn sweep_leds(&mut self, now_ms: i64) -> usize {
        let changed = led_service::sweep(&mut self.registry, now_ms);
        let count = changed.len();

        for tower in changed {
            self.hub.publish_tower(tower);
        }

        count
    }

    /// Asserts the call line of the tower with exactly `tower_id` and
    /// returns the clear to schedule.
    pub fn trigger_call(&mut self, tower_id: &str, clear_after: Duration) -> Option<PendingClear> {
        let tower = alarm_service::raise(&mut self.registry, tower_id)?;

        self.log(LogKind::Alarm, format!("CALL BUTTON pressed (Input1) on {}", tower.id));
        self.broadcast_tower(tower);

        Some(PendingClear {
            tower: tower_id.to_string(),
            after: clear_after,
        })
    }

    /// Fires a scheduled clear. Returns `false` when the call line was
    /// already cleared by something else.
    pub fn expire_call(&mut self, tower_id: &str) -> bool {
        let Some(tower) = alarm_service::clear_if_raised(&mut self.registry, tower_id) else {
            return false;
        };

        self.log(LogKind::Alarm, format!("CALL BUTTON cleared on {}", tower.id));
        self.broadcast_tower(tower);

        true
    }

    pub fn toggle_output(&mut self, token: &str, index: i64) -> Result<TowerResponse, TowerError> {
        let tower = self
            .registry
            .lookup_mut(token)
            .ok_or(TowerError::TowerNotFound)?;
        let line = usize::try_from(index)
            .ok()
            .filter(|&line| line < IO_LINES)
            .ok_or(TowerError::InvalidOutputIndex)?;

        tower.outputs[line] ^= 1;
        let tower = tower.clone();
        let state = tower.outputs[line];

        self.log(
            LogKind::Output,
            format!("{} OUT{} {}", tower.id, line + 1, on_off(state)),
        );
        self.send_command(topics::tower_output(&tower.id), &json!({ "index": line, "state": state }));
        self.broadcast_tower(tower.clone());

        Ok(TowerResponse {
            tower,
            stats: self.registry.stats(),
        })
    }

    /// Applies an LED command to the tower named by `token`, its region or
    /// the whole fleet depending on the request target.
    pub fn apply_led(&mut self, token: &str, request: &LedRequest, now_ms: i64) -> Result<LedResponse, TowerError> {
        let anchor = self.registry.lookup(token).ok_or(TowerError::TowerNotFound)?;
        let anchor_id = anchor.id.clone();
        let region_name = anchor.region_name.clone();

        let command = LedCommand::from_request(request).ok_or(TowerError::MissingMode)?;
        let body = request.command_body().ok_or(TowerError::MissingMode)?;

        let mut updated = Vec::new();
        for tower in self.registry.towers_mut() {
            let selected = match request.target {
                LedTarget::Tower => tower.id == anchor_id,
                LedTarget::Region => tower.region_name == region_name,
                LedTarget::All => true,
            };
            if selected {
                led_service::apply(tower, &command, now_ms);
                updated.push(tower.id.clone());
                self.hub.publish_tower(tower.clone());
            }
        }

        let (scope, topic) = match request.target {
            LedTarget::Tower => ("TOWER", topics::tower_led(&anchor_id)),
            LedTarget::Region => ("REGION", topics::group_led(&region_name)),
            LedTarget::All => ("ALL", topics::all_led()),
        };

        let mut parts = vec![scope.to_string()];
        if request.target == LedTarget::Region {
            parts.push(region_name.clone());
        }
        if body.preset.is_empty() {
            parts.push(body.mode.clone());
        } else {
            parts.push(format!("{}({})", body.mode, body.preset));
        }
        if !body.text.is_empty() {
            parts.push(format!("\"{}\"", body.text));
        }

        self.log(LogKind::Led, parts.join(" "));
        let stats = self.registry.stats();
        self.hub.publish_stats(stats);
        self.send_command(topic, &body);

        Ok(LedResponse { updated, stats })
    }

    pub fn press_to_talk(&mut self, token: &str) -> Result<AckResponse, TowerError> {
        let tower_id = self
            .registry
            .lookup(token)
            .map(|tower| tower.id.clone())
            .ok_or(TowerError::TowerNotFound)?;

        self.log(LogKind::Ptt, format!("Press-to-talk started on {tower_id}"));
        self.send_command(topics::tower_ptt(&tower_id), &json!({ "action": "start" }));

        Ok(AckResponse::ok())
    }

    /// Triggers a call on the tower with exactly `tower_id`, or on a random
    /// tower when none is given.
    pub fn demo_call(&mut self, tower_id: Option<&str>, clear_after: Duration) -> Result<PendingClear, TowerError> {
        let tower_id = match tower_id {
            Some(id) => id.to_string(),
            None => self
                .simulator
                .pick_tower(&self.registry)
                .ok_or(TowerError::TowerNotFound)?,
        };

        self.trigger_call(&tower_id, clear_after)
            .ok_or(TowerError::TowerNotFound)
    }

    /// Simulated call button press on a random tower.
    pub fn simulate_call(&mut self, clear_after: Duration) -> Option<PendingClear> {
        let tower_id = self.simulator.pick_tower(&self.registry)?;

        self.trigger_call(&tower_id, clear_after)
    }

    /// Flips a random output line of a random tower, returning its id.
    pub fn simulate_output(&mut self) -> Option<String> {
        let tower_id = self.simulator.pick_tower(&self.registry)?;
        let line = self.simulator.pick_line();

        let tower = self.registry.get_mut(&tower_id)?;
        tower.outputs[line] ^= 1;
        let tower = tower.clone();

        self.log(
            LogKind::Output,
            format!("Simulator toggled {} OUT{} {}", tower.id, line + 1, on_off(tower.outputs[line])),
        );
        self.broadcast_tower(tower);

        Some(tower_id)
    }

    fn broadcast_tower(&self, tower: Tower) {
        self.hub.publish_tower(tower);
        self.hub.publish_stats(self.registry.stats());
    }

    fn send_command<T: Serialize>(&self, topic: String, payload: &T) {
        let Some(outbox) = &self.outbox else {
            tracing::debug!("MQTT disabled, dropping command on {}", topic);
            return;
        };

        match serde_json::to_value(payload) {
            Ok(payload) => {
                if outbox.send(DeviceCommand { topic, payload }).is_err() {
                    tracing::warn!("MQTT gateway stopped, command dropped");
                }
            }
            Err(e) => tracing::error!("Failed to encode command for {}: {}", topic, e),
        }
    }
}

fn on_off(state: u8) -> &'static str {
    if state == 1 { "ON" } else { "OFF" }
}

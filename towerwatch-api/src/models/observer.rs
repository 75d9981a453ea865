use serde::{Deserialize, Serialize};

use super::{FleetSnapshot, FleetStats, LogEntry, Tower};

/// Messages pushed from the engine to connected observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObserverMessage {
    /// Full state, sent once when an observer connects
    Init { data: FleetSnapshot },
    TowerUpdate { tower: Tower },
    Stats { stats: FleetStats },
    Log { entry: LogEntry },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogKind;

    #[test]
    fn test_messages_are_tagged_by_type() {
        let stats = ObserverMessage::Stats {
            stats: FleetStats { online: 3, offline: 1, alarms: 2 },
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["type"], "stats");
        assert_eq!(value["stats"]["alarms"], 2);

        let log = ObserverMessage::Log {
            entry: LogEntry::now(LogKind::Alarm, "CALL BUTTON pressed (Input1) on PERTH PR1001"),
        };
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["type"], "log");
        assert_eq!(value["entry"]["type"], "ALARM");
        assert!(value["entry"]["ts"].is_string());
    }
}

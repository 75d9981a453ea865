//! MQTT topic layout shared by the engine and field devices.
//!
//! Devices publish telemetry on `tower/<id>/event/<kind>` and receive
//! commands on `tower/<id>/cmd/<name>`. Region and fleet wide LED commands
//! go to `group/<region name>/cmd/led` and `group/all/cmd/led`.

/// Filter covering every telemetry topic of every tower.
pub const TOWER_EVENTS: &str = "tower/+/event/#";

pub fn tower_output(tower_id: &str) -> String {
    format!("tower/{tower_id}/cmd/output")
}

pub fn tower_led(tower_id: &str) -> String {
    format!("tower/{tower_id}/cmd/led")
}

pub fn tower_ptt(tower_id: &str) -> String {
    format!("tower/{tower_id}/cmd/ptt")
}

pub fn group_led(region_name: &str) -> String {
    format!("group/{region_name}/cmd/led")
}

pub fn all_led() -> String {
    group_led("all")
}

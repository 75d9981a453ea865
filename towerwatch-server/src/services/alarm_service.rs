use std::time::Duration;

use towerwatch_api::{CALL_INPUT, Tower};

use crate::services::DeviceRegistry;

/// A deferred call clear. It carries no cancellation: whoever fires it
/// hands it to [`clear_if_raised`], which re-reads the tower first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClear {
    pub tower: String,
    pub after: Duration,
}

/// Asserts the call line, returning the updated tower.
pub fn raise(registry: &mut DeviceRegistry, tower_id: &str) -> Option<Tower> {
    let tower = registry.get_mut(tower_id)?;
    tower.inputs[CALL_INPUT] = 1;

    Some(tower.clone())
}

/// Clears the call line only if it is still asserted.
pub fn clear_if_raised(registry: &mut DeviceRegistry, tower_id: &str) -> Option<Tower> {
    let tower = registry.get_mut(tower_id)?;
    if tower.inputs[CALL_INPUT] != 1 {
        return None;
    }
    tower.inputs[CALL_INPUT] = 0;

    Some(tower.clone())
}

mod led;
mod log;
mod observer;
mod region;
mod tower;

pub use led::*;
pub use log::*;
pub use observer::*;
pub use region::*;
pub use tower::*;

use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetStats {
    /// Towers currently reporting online
    pub online: usize,
    /// Towers currently offline
    pub offline: usize,
    /// Towers with at least one input asserted
    pub alarms: usize,
}

impl FleetStats {
    pub fn from_towers<'a, I>(towers: I) -> Self
    where
        I: IntoIterator<Item = &'a Tower>,
    {
        towers.into_iter().fold(Self::default(), |mut stats, tower| {
            if tower.online {
                stats.online += 1;
            } else {
                stats.offline += 1;
            }
            if tower.has_alarm() {
                stats.alarms += 1;
            }
            stats
        })
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Every tower in registry order
    pub towers: Vec<Tower>,
    /// Static region reference data
    pub regions: Vec<Region>,
    /// Aggregate statistics at snapshot time
    pub stats: FleetStats,
    /// Most recent log entries, oldest first
    pub logs: Vec<LogEntry>,
}

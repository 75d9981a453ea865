use serde::{Deserialize, Serialize};

use super::LedState;

/// Number of binary input and output lines on every tower.
pub const IO_LINES: usize = 3;

/// Index of the input line wired to the call button.
pub const CALL_INPUT: usize = 0;

pub type IoLines = [u8; IO_LINES];

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tower {
    /// Unique id, `"{region name} {region code}{sequence}"`
    pub id: String,
    pub region_name: String,
    pub region_code: String,
    pub site: String,
    pub ip: String,
    pub online: bool,
    /// Signal strength bars, 1 to 5
    pub signal: u8,
    /// Input lines, each 0 or 1. Line 0 is the call button.
    #[cfg_attr(feature = "docs", schema(value_type = Vec<u8>))]
    pub inputs: IoLines,
    /// Output lines, each 0 or 1
    #[cfg_attr(feature = "docs", schema(value_type = Vec<u8>))]
    pub outputs: IoLines,
    pub loc: GeoPoint,
    pub led: LedState,
}

impl Tower {
    pub fn has_alarm(&self) -> bool {
        self.inputs.iter().any(|&line| line == 1)
    }
}

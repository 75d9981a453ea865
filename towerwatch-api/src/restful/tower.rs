use serde::{Deserialize, Serialize};

use crate::models::{FleetStats, Tower};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRequest {
    /// Output line to toggle (0-2)
    pub index: i64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerResponse {
    /// Tower state after the command
    pub tower: Tower,
    /// Refreshed fleet statistics
    pub stats: FleetStats,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoCallRequest {
    /// Exact tower id, a random tower is used when absent
    #[serde(default)]
    pub id: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Display name, e.g. `PERTH`
    pub name: String,
    /// Short code used in tower ids, e.g. `PR`
    pub code: String,
    /// Base latitude
    pub lat: f64,
    /// Base longitude
    pub lng: f64,
}

impl Region {
    pub fn new(name: &str, code: &str, lat: f64, lng: f64) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            lat,
            lng,
        }
    }
}

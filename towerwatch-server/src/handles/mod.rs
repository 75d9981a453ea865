mod demo_handle;
mod docs_handle;
mod state_handle;
mod tower_handle;
mod ws_handle;

pub use demo_handle::*;
pub use docs_handle::*;
pub use state_handle::*;
pub use tower_handle::*;
pub use ws_handle::*;

use crate::services::FleetHandle;

#[derive(Clone)]
pub struct FleetState {
    pub fleet: FleetHandle,
}

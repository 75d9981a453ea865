pub mod alarm_service;
pub mod broadcast_service;
mod fleet_runtime;
mod fleet_service;
pub mod led_service;
mod registry_service;
mod simulator_service;
pub mod telemetry;
mod transport;

pub use alarm_service::PendingClear;
pub use broadcast_service::{BroadcastHub, LogBook, Observer};
pub use fleet_runtime::*;
pub use fleet_service::*;
pub use led_service::LedCommand;
pub use registry_service::*;
pub use simulator_service::*;
pub use transport::*;

pub mod models;
pub mod restful;
pub mod topics;

pub use models::*;

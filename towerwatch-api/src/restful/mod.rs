mod led;
mod tower;

pub use led::*;
pub use tower::*;

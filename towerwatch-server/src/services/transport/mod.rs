mod mqtt;

pub use mqtt::*;

// Frameworks layer: configuration, arena bootstrap, and the async runtime.

pub mod arena;
pub mod config;
pub mod runtime;

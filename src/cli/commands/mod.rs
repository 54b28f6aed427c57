//! CLI command implementations

pub mod allocate;
pub mod config;

pub use allocate::execute as allocate;
pub use config::execute as config;

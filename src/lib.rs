//! stagepath - Staging-path allocator
//!
//! Derives temp paths for data-movement jobs inside staging directories
//! colocated with the destination's real namespace, so promotion is a
//! same-filesystem rename even behind a federated (view) mount.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod path;
pub mod staging;

pub use context::{ExecutionContext, ThreadExecutionContext};
pub use error::{StagingError, StagingResult};
pub use path::FsPath;
pub use staging::{StagingAllocator, StagingCache, StagingKey};

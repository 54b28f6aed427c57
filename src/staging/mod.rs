//! Staging directory allocation
//!
//! Given a destination path, hands out a unique temp path inside a
//! staging directory colocated with the destination.
//!
//! # Flow
//!
//! 1. Qualify the destination; on a view mount use its parent instead
//! 2. Derive the staging root (`<basis>/.staging`, or the existing root
//!    if the basis already lives under one)
//! 3. Look up `(filesystem, root, execution unit)` in the cache; on a
//!    miss create `<root>_<execution id>-<unit>` and register it for
//!    cleanup when the filesystem session ends
//! 4. Append `<tmp prefix><path id>`
//!
//! Only the cache and the id counter are shared mutable state, and both
//! are owned by the allocator (or explicitly shared through an `Arc`).

mod allocator;
mod cache;
mod ids;
mod key;

pub use allocator::StagingAllocator;
pub use cache::{CacheStats, StagingCache};
pub use ids::PathIdCounter;
pub use key::{derive_staging_root, StagingKey};

//! Path id source

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic id source for temp leaf names
///
/// Owned by an allocator, so separate allocators never share a sequence.
/// Ids are retired as soon as they are handed out, whether or not the
/// path they were meant for is ever used.
#[derive(Debug)]
pub struct PathIdCounter {
    last: AtomicU64,
}

impl PathIdCounter {
    /// Counter whose first id is `seed + 1`
    pub fn new(seed: u64) -> Self {
        Self {
            last: AtomicU64::new(seed),
        }
    }

    /// Next id, strictly greater than every id issued before it
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Most recently issued id (the seed if none yet)
    pub fn last_id(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

impl Default for PathIdCounter {
    fn default() -> Self {
        Self::new(10000)
    }
}

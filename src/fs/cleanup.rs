//! Deferred-deletion registry tied to a filesystem session

use crate::path::FsPath;
use parking_lot::Mutex;
use std::io;
use tracing::{debug, info, warn};

/// Paths to remove when the owning filesystem session ends
///
/// Registration order is preserved and duplicates are ignored. Removal
/// runs newest-first so nested registrations go before their parents.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    paths: Mutex<Vec<FsPath>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path; returns `false` if it was already registered
    pub fn register(&self, path: &FsPath) -> bool {
        let mut paths = self.paths.lock();
        if paths.contains(path) {
            return false;
        }
        debug!("Registered {} for deletion on close", path);
        paths.push(path.clone());
        true
    }

    /// Drop a registration; returns `false` if the path was not registered
    pub fn cancel(&self, path: &FsPath) -> bool {
        let mut paths = self.paths.lock();
        let before = paths.len();
        paths.retain(|p| p != path);
        paths.len() != before
    }

    pub fn contains(&self, path: &FsPath) -> bool {
        self.paths.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }

    /// Take every registered path, newest first, leaving the registry empty
    pub fn drain(&self) -> Vec<FsPath> {
        let mut paths = std::mem::take(&mut *self.paths.lock());
        paths.reverse();
        paths
    }

    /// Remove every registered path with `remove`
    ///
    /// Best-effort: failures are logged and skipped. Returns how many
    /// removals succeeded.
    pub fn run<F>(&self, mut remove: F) -> usize
    where
        F: FnMut(&FsPath) -> io::Result<()>,
    {
        let paths = self.drain();
        if paths.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for path in &paths {
            match remove(path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to clean up {}: {}", path, e),
            }
        }

        info!("Cleaned up {} of {} staging paths", removed, paths.len());
        removed
    }
}

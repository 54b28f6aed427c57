//! Staging directory cache
//!
//! Maps a `StagingKey` to the directory materialized for it. Locking is
//! per key: the map is only touched to find or insert a key's slot, and
//! the slot's own mutex is held across lookup, creation and store. Two
//! callers racing on one key therefore create the directory once, while
//! creation I/O for unrelated keys runs in parallel.

use crate::error::StagingResult;
use crate::path::FsPath;
use crate::staging::StagingKey;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

type Slot = Arc<Mutex<Option<FsPath>>>;

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Requests answered from the cache
    pub hits: AtomicU64,
    /// Requests that had to materialize a directory
    pub misses: AtomicU64,
    /// Materializations that failed
    pub failures: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// In-memory staging directory cache
///
/// Entries are never evicted. A failed materialization stores nothing and
/// drops the key's slot, so the next request for that key tries again.
#[derive(Debug, Default)]
pub struct StagingCache {
    slots: DashMap<StagingKey, Slot>,
    stats: CacheStats,
}

impl StagingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the directory for `key`, materializing it with `create` on
    /// first use
    ///
    /// `create` runs at most once per key unless it fails.
    pub fn get_or_create<F>(&self, key: &StagingKey, create: F) -> StagingResult<FsPath>
    where
        F: FnOnce() -> StagingResult<FsPath>,
    {
        let slot = self.slot(key);
        let mut entry = slot.lock();

        if let Some(dir) = entry.as_ref() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Staging cache hit for {}", key);
            return Ok(dir.clone());
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        match create() {
            Ok(dir) => {
                *entry = Some(dir.clone());
                Ok(dir)
            }
            Err(e) => {
                drop(entry);
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                debug!("Staging dir for {} not created: {}", key, e);
                // Only when no other caller holds the slot: the map and us
                self.slots.remove_if(key, |_, held| {
                    Arc::ptr_eq(held, &slot)
                        && Arc::strong_count(held) == 2
                        && held.lock().is_none()
                });
                Err(e)
            }
        }
    }

    /// Directory already materialized for `key`, if any
    pub fn lookup(&self, key: &StagingKey) -> Option<FsPath> {
        let slot = self.slots.get(key).map(|s| Arc::clone(s.value()))?;
        let entry = slot.lock();
        entry.clone()
    }

    /// Number of materialized directories
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.value().lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every materialized directory, in no particular order
    pub fn dirs(&self) -> Vec<FsPath> {
        self.slots
            .iter()
            .filter_map(|slot| slot.value().lock().clone())
            .collect()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn slot(&self, key: &StagingKey) -> Slot {
        if let Some(slot) = self.slots.get(key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(
            self.slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(None)))
                .value(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StagingError;
    use std::sync::atomic::AtomicUsize;

    fn key(unit: &str) -> StagingKey {
        StagingKey::new("hdfs://nn1", "/a/.staging", unit)
    }

    fn dir(s: &str) -> FsPath {
        FsPath::parse(s).unwrap()
    }

    #[test]
    fn second_call_is_a_hit() {
        let cache = StagingCache::new();
        let calls = AtomicUsize::new(0);
        let create = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(dir("hdfs://nn1/a/.staging_x-u1"))
        };

        let first = cache.get_or_create(&key("u1"), create).unwrap();
        let second = cache.get_or_create(&key("u1"), create).unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_units_get_distinct_entries() {
        let cache = StagingCache::new();
        cache
            .get_or_create(&key("u1"), || Ok(dir("hdfs://nn1/a/.staging_x-u1")))
            .unwrap();
        cache
            .get_or_create(&key("u2"), || Ok(dir("hdfs://nn1/a/.staging_y-u2")))
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.lookup(&key("u2")),
            Some(dir("hdfs://nn1/a/.staging_y-u2"))
        );
    }

    #[test]
    fn failure_leaves_no_entry() {
        let cache = StagingCache::new();

        let err = cache
            .get_or_create(&key("u1"), || {
                Err(StagingError::StagingDirDenied {
                    path: "hdfs://nn1/a/.staging_x-u1".to_string(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, StagingError::StagingDirDenied { .. }));
        assert!(cache.lookup(&key("u1")).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().failures(), 1);
        assert!(cache.slots.is_empty());

        // Retry materializes
        let retried = cache
            .get_or_create(&key("u1"), || Ok(dir("hdfs://nn1/a/.staging_z-u1")))
            .unwrap();
        assert_eq!(retried, dir("hdfs://nn1/a/.staging_z-u1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_callers_create_once() {
        let cache = StagingCache::new();
        let calls = AtomicUsize::new(0);

        let results: Vec<FsPath> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    s.spawn(|| {
                        cache
                            .get_or_create(&key("u1"), || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                std::thread::sleep(std::time::Duration::from_millis(5));
                                Ok(dir("hdfs://nn1/a/.staging_x-u1"))
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|d| *d == results[0]));
        assert_eq!(cache.stats().hits(), 15);
    }
}

//! # Result Cache
//!
//! A bounded, time-expiring key/value store that sits in front of the
//! rate-limited history endpoint.
//!
//! ## Rules:
//! - **Capacity**: at most `max_entries` entries; inserting into a full cache
//!   evicts the least-recently-used one. Reads count as use.
//! - **Expiry**: an entry is only visible while `now - inserted_at < ttl`. An
//!   expired entry reads as absent and is removed by that read, whether or not
//!   it would have been evicted yet. Expired entries that nobody reads keep
//!   their slot, so a full cache may evict a live LRU entry while stale ones
//!   remain; there is no background sweep.
//! - **Concurrency**: one mutex guards every get/set/evict. Entries are
//!   independent, so no operation ever needs more than one lock acquisition.
//!
//! Timestamps come from `tokio::time::Instant`, which lets tests drive expiry
//! with a paused clock.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use lru::LruCache;
use serde_json::Value;
use tokio::time::Instant;

use crate::configs::watch_config::CacheConfig;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe LRU cache with a per-entry time-to-live.
pub struct ResultCache<V = Value> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ResultCache<V> {
    /// Creates an empty cache. A `max_entries` of zero is treated as one.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
        }
    }

    /// Returns a clone of the live value for `key`, promoting it to most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().expect("ResultCache lock poisoned");

        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => {}
            None => return None,
        }

        entries.pop(key);
        log::trace!("Cache entry '{}' expired", key);
        None
    }

    /// Stores `value` under `key`, restarting its time-to-live.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        let key = key.into();
        let mut entries = self.entries.lock().expect("ResultCache lock poisoned");
        // `push` hands back the replaced pair too; only a different key is an eviction.
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                log::trace!("Cache evicted '{}'", evicted);
            }
        }
    }

    /// Number of stored entries, including ones that expired but were not read since.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("ResultCache lock poisoned").len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

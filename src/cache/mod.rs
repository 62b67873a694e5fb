//! Bounded in-memory TTL cache
//!
//! Sits in front of every upstream call. Expiry is lazy (discovered on read)
//! with an opt-in eager sweep; eviction at capacity removes the
//! oldest-inserted entry after sweeping out dead weight.

pub mod key;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::debug;

use crate::config::CacheConfig;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// An entry is live iff `now - stored_at <= ttl`.
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// Observability snapshot, no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
}

/// Key/value store with per-entry expiry and a maximum entry count.
///
/// Insertion order is tracked so that eviction at capacity removes the
/// oldest-inserted entry (not least-recently-used, not closest-to-expiry).
/// All mutation happens under one lock, so the check-capacity/sweep/evict/
/// insert sequence of [`TtlCache::set`] is a single critical section.
pub struct TtlCache<V> {
    entries: Mutex<IndexMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            default_ttl: config.default_ttl,
            max_entries: config.max_entries,
        }
    }

    /// A poisoned lock only means another caller panicked mid-operation;
    /// entries are inserted and removed atomically, so the map is still
    /// usable and we keep serving.
    fn lock(&self) -> MutexGuard<'_, IndexMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` under `key` with `ttl`, or the default TTL when absent.
    ///
    /// Overwriting an existing key resets its insertion position and never
    /// triggers capacity handling, since the size is unchanged. A fresh
    /// insertion at capacity first sweeps expired entries; if the store is
    /// still full, the oldest-inserted entry is evicted.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        debug_assert!(!ttl.is_zero(), "cache TTL must be positive");

        let now = Instant::now();
        let mut entries = self.lock();

        // Re-inserting moves the key to the back of the insertion order.
        let existed = entries.shift_remove(&key).is_some();

        if !existed && entries.len() >= self.max_entries {
            entries.retain(|_, entry| !entry.is_expired(now));

            if entries.len() >= self.max_entries {
                if let Some((evicted, _)) = entries.shift_remove_index(0) {
                    debug!("Cache full, evicted oldest entry: {evicted}");
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                ttl,
            },
        );
    }

    /// Returns the stored value if present and not expired. An expired entry
    /// is deleted as a side effect; a stale value is never returned.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.shift_remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Same freshness check and eager-deletion side effect as [`TtlCache::get`],
    /// without cloning the value out.
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.shift_remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Removes `key` if present; reports whether a removal happened.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().shift_remove(key).is_some()
    }

    /// Removes all entries unconditionally.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Removes every currently-expired entry; returns how many were dropped.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.lock().len(),
            max_size: self.max_entries,
        }
    }
}

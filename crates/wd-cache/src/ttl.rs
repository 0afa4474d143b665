//! TTL cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

/// Default entry lifetime: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached value with its insertion time.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub timestamp: Instant,
}

/// Thread-safe map from string keys to values that expire after a TTL.
///
/// An entry is valid while `now - timestamp <= ttl`. Reads share a lock;
/// writes are last-writer-wins.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given TTL and the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with the given TTL and time source.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.timestamp) <= self.ttl
    }

    /// Look up a fresh entry.
    ///
    /// An expired entry is removed and reported as absent.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().unwrap();
            match entries.get(key) {
                None => return None,
                Some(entry) if self.is_fresh(entry, now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent set may have refreshed it.
        let mut entries = self.entries.write().unwrap();
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                tracing::debug!(key, "Evicted expired cache entry");
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite an entry, stamped with the current time.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            timestamp: self.clock.now(),
        };
        self.entries.write().unwrap().insert(key.into(), entry);
    }

    /// Remove an entry. Returns `true` if it was present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().unwrap().remove(key).is_some()
    }

    /// Remove all entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry and return how many were removed.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.timestamp) <= self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
        }
        removed
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

//! In-memory LRU cache with time-based expiry for API responses.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use owm_core::constants::{DEFAULT_CACHE_ITEM_LIFETIME_MILLIS, DEFAULT_CACHE_MAX_SIZE};
use owm_core::error::{OwmError, Result};
use owm_core::redact::redact_key;
use owm_core::traits::{Clock, ResponseCache};

use crate::clock::SystemClock;
use crate::recency::{NodeId, RecencyList};

/// Cache entry with its last write/read time.
struct CacheEntry<V> {
    value: V,
    inserted_at: i64,
    node: NodeId,
}

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of distinct keys retained
    pub max_size: usize,
    /// Maximum age in milliseconds before a read treats an entry as expired
    pub item_lifetime_millis: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_MAX_SIZE,
            item_lifetime_millis: DEFAULT_CACHE_ITEM_LIFETIME_MILLIS,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the given bounds.
    pub fn new(max_size: usize, item_lifetime_millis: u64) -> Self {
        Self {
            max_size,
            item_lifetime_millis,
        }
    }

    /// Item lifetime as a `Duration`.
    pub fn item_lifetime(&self) -> Duration {
        Duration::from_millis(self.item_lifetime_millis)
    }

    /// Rejects non-positive bounds.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(OwmError::ConfigError(
                "cache max_size must be greater than zero".into(),
            ));
        }
        if self.item_lifetime_millis == 0 {
            return Err(OwmError::ConfigError(
                "cache item_lifetime_millis must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently tracked (may include not-yet-detected expired ones)
    pub size: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries dropped to make room for new keys
    pub evictions: u64,
    /// Entries dropped because a read found them too old
    pub expirations: u64,
}

impl CacheStats {
    /// Hit rate in [0.0, 1.0]; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Mapping and recency list, always mutated together.
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    recency: RecencyList<String>,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl<V> Inner<V> {
    /// Drops the least recently used entry.
    fn evict_lru(&mut self) {
        while let Some(victim) = self.recency.pop() {
            if self.entries.remove(&victim).is_some() {
                self.evictions += 1;
                debug!(key = %redact_key(&victim), "Evicted least recently used entry");
                return;
            }
            warn!(key = %redact_key(&victim), "Recency list held a key with no cache entry");
        }
        if !self.entries.is_empty() {
            warn!(entries = self.entries.len(), "Recency list drained while cache is full; resetting");
            self.entries.clear();
        }
    }

    /// Drops `key` from both structures.
    fn discard(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.remove(key)?;
        if self.recency.remove_node(entry.node).is_none() {
            warn!(key = %redact_key(key), "Stale recency handle on discard");
            self.recency.remove(key);
        }
        Some(entry.value)
    }
}

/// Bounded, expiring LRU cache keyed by request URL.
///
/// A read hit refreshes both recency and the entry's timestamp, so an entry
/// read more often than its lifetime never expires. Expired entries are only
/// detected when read. Thread-safe: the mapping and the recency list sit
/// behind one mutex.
pub struct LruCache<V = String> {
    inner: Mutex<Inner<V>>,
    config: CacheConfig,
    lifetime_millis: i64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> LruCache<V> {
    /// Creates a cache holding at most `max_size` entries for
    /// `item_lifetime_millis` each.
    pub fn new(max_size: usize, item_lifetime_millis: u64) -> Result<Self> {
        Self::with_config(CacheConfig::new(max_size, item_lifetime_millis))
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(config.max_size),
                recency: RecencyList::with_capacity(config.max_size),
                hits: 0,
                misses: 0,
                evictions: 0,
                expirations: 0,
            }),
            lifetime_millis: i64::try_from(config.item_lifetime_millis).unwrap_or(i64::MAX),
            config,
            clock,
        }
    }

    /// Gets a cached value by key.
    ///
    /// Returns `None` if absent or expired. An expired entry is removed.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let Some(entry) = inner.entries.get_mut(key) else {
            inner.misses += 1;
            debug!(key = %redact_key(key), "Cache miss");
            return None;
        };

        if now.saturating_sub(entry.inserted_at) > self.lifetime_millis {
            inner.discard(key);
            inner.expirations += 1;
            inner.misses += 1;
            debug!(key = %redact_key(key), "Cache entry expired");
            return None;
        }

        if inner.recency.remove_node(entry.node).is_none() {
            warn!(key = %redact_key(key), "Stale recency handle on read; dropping entry");
            inner.entries.remove(key);
            inner.recency.remove(key);
            inner.misses += 1;
            return None;
        }
        entry.node = inner.recency.add(key.to_owned());
        entry.inserted_at = now;
        inner.hits += 1;
        debug!(key = %redact_key(key), "Cache hit");
        Some(entry.value.clone())
    }

    /// Caches a value, evicting the least recently used entry if a new key
    /// would overflow the cache.
    pub fn set(&self, key: &str, value: V) {
        let now = self.clock.now_millis();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(entry) = inner.entries.get_mut(key) {
            entry.value = value;
            entry.inserted_at = now;
            if inner.recency.remove_node(entry.node).is_none() {
                warn!(key = %redact_key(key), "Stale recency handle on write");
                inner.recency.remove(key);
            }
            entry.node = inner.recency.add(key.to_owned());
            debug!(key = %redact_key(key), "Cache entry refreshed");
            return;
        }

        if inner.entries.len() >= self.config.max_size {
            inner.evict_lru();
        }

        let node = inner.recency.add(key.to_owned());
        inner.entries.insert(
            key.to_owned(),
            CacheEntry {
                value,
                inserted_at: now,
                node,
            },
        );
        debug!(key = %redact_key(key), size = inner.entries.len(), "Cache entry stored");
    }

    /// Removes a cached entry, returning its value.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner.lock().discard(key)
    }

    /// Returns true if `key` is tracked, without touching recency or expiry.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().recency.snapshot()
    }

    /// Clears all cached entries. Statistics are kept.
    pub fn clean(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.recency.clear();
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Returns the configuration the cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.entries.len(),
            capacity: self.config.max_size,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            expirations: inner.expirations,
        }
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let inner = self.inner.lock();
        assert_eq!(inner.entries.len(), inner.recency.len());
        assert!(inner.entries.len() <= self.config.max_size);
        for key in inner.recency.iter() {
            assert!(inner.entries.contains_key(key), "orphan key {key}");
        }
    }
}

impl<V: Clone> Default for LruCache<V> {
    fn default() -> Self {
        Self::build(CacheConfig::default(), Arc::new(SystemClock))
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("config", &self.config)
            .field("len", &self.inner.lock().entries.len())
            .finish()
    }
}

impl ResponseCache for LruCache<String> {
    fn get(&self, key: &str) -> Option<String> {
        LruCache::get(self, key)
    }

    fn set(&self, key: &str, value: String) {
        LruCache::set(self, key, value)
    }

    fn clean(&self) {
        LruCache::clean(self)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

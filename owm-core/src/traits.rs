//! Common traits for owm.
//!
//! The HTTP layer only ever talks to a cache through [`ResponseCache`], so
//! the caching strategy is chosen by whoever builds the client.

// ═══════════════════════════════════════════════════════════════════════════════
// RESPONSE CACHE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for caching raw API responses keyed by request URL.
///
/// Implementations might be:
/// - An expiring LRU cache (the default when caching is enabled)
/// - A null cache that never stores anything
///
/// All methods are total: a lookup that cannot be served is a miss, and
/// a write that cannot be honoured is dropped.
pub trait ResponseCache: Send + Sync {
    /// Returns the cached payload for `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: String);

    /// Removes every cached entry.
    fn clean(&self);

    /// Number of entries currently tracked.
    fn size(&self) -> usize;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of the current time as Unix milliseconds.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

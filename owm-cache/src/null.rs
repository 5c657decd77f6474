//! Cache that stores nothing.

use tracing::trace;

use owm_core::redact_key;
use owm_core::traits::ResponseCache;

/// A [`ResponseCache`] whose every lookup misses.
///
/// Used when caching is disabled so the HTTP layer keeps a single code path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCache;

impl NullCache {
    /// Creates a null cache.
    pub fn new() -> Self {
        Self
    }
}

impl ResponseCache for NullCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, key: &str, _value: String) {
        trace!(key = %redact_key(key), "Null cache dropped write");
    }

    fn clean(&self) {}

    fn size(&self) -> usize {
        0
    }
}

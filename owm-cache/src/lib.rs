//! # OWM Cache
//!
//! Response cache for the owm weather client.
//!
//! - [`LruCache`]: bounded cache with sliding expiry and LRU eviction
//! - [`RecencyList`]: arena-backed recency ordering used by the cache
//! - [`NullCache`]: stores nothing, for when caching is disabled
//!
//! ## Example
//!
//! ```rust
//! use owm_cache::LruCache;
//!
//! let cache: LruCache = LruCache::new(2, 60_000).unwrap();
//! cache.set("https://api.example/weather?q=Oslo", "{}".to_string());
//! cache.set("https://api.example/weather?q=Bergen", "{}".to_string());
//! cache.set("https://api.example/weather?q=Tromso", "{}".to_string());
//!
//! // Oslo was the least recently used key and got evicted
//! assert!(cache.get("https://api.example/weather?q=Oslo").is_none());
//! assert_eq!(cache.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod clock;
mod null;
mod recency;

pub use cache::{CacheConfig, CacheStats, LruCache};
pub use clock::{ManualClock, SystemClock};
pub use null::NullCache;
pub use recency::{Iter, NodeId, RecencyList};

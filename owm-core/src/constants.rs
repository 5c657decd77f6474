//! Constants for owm.
//!
//! Endpoint paths and parameter names follow the public weather API;
//! cache defaults are sized for an interactive client that repeats a
//! handful of queries.

// ═══════════════════════════════════════════════════════════════════════════════
// API
// ═══════════════════════════════════════════════════════════════════════════════

/// Root URL of the weather API (version 2.5 endpoints).
pub const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "APPID";

/// Current weather endpoint.
pub const ENDPOINT_WEATHER: &str = "weather";

/// 5 day / 3 hour forecast endpoint.
pub const ENDPOINT_FORECAST: &str = "forecast";

/// Air pollution index endpoint.
pub const ENDPOINT_AIR_POLLUTION: &str = "air_pollution";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "en";

// ═══════════════════════════════════════════════════════════════════════════════
// GEOGRAPHY
// ═══════════════════════════════════════════════════════════════════════════════

/// Valid latitude range, degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range, degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default maximum number of cached responses.
pub const DEFAULT_CACHE_MAX_SIZE: usize = 20;

/// Default lifetime of a cached response: 10 minutes.
pub const DEFAULT_CACHE_ITEM_LIFETIME_MILLIS: u64 = 10 * 60 * 1000;

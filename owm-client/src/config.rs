//! Client configuration.

use serde::{Deserialize, Serialize};

use owm_cache::CacheConfig;
use owm_core::constants::{DEFAULT_API_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_SECONDS};
use owm_core::error::{OwmError, Result};

/// Weather API client configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API key, sent as the `APPID` query parameter
    pub api_key: String,
    /// API root, e.g. "https://api.openweathermap.org/data/2.5"
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Language of textual fields in responses
    pub language: String,
    /// Unit system ("metric", "imperial"); API default when unset
    pub units: Option<String>,
    /// Response cache settings; `None` disables caching
    pub cache: Option<CacheConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_API_BASE_URL.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            language: DEFAULT_LANGUAGE.into(),
            units: None,
            cache: Some(CacheConfig::default()),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Points the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the response language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the unit system.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Enables caching with the given settings.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Disables response caching.
    pub fn no_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Loads configuration from the environment (and `.env` if present).
    ///
    /// Reads `OWM_API_KEY`, `OWM_BASE_URL`, `OWM_TIMEOUT`, `OWM_LANGUAGE`,
    /// `OWM_UNITS`, `OWM_CACHE`, `OWM_CACHE_SIZE`, `OWM_CACHE_TTL_MS`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    ///
    /// `lookup` maps a variable name to its value, as [`std::env::var`] would.
    /// Unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(key) = lookup("OWM_API_KEY") {
            config.api_key = key;
        }
        if let Some(url) = lookup("OWM_BASE_URL") {
            config.base_url = url;
        }
        if let Some(timeout) = lookup("OWM_TIMEOUT") {
            config.timeout_seconds = parse_number("OWM_TIMEOUT", &timeout)?;
        }
        if let Some(language) = lookup("OWM_LANGUAGE") {
            config.language = language;
        }
        config.units = lookup("OWM_UNITS");

        let enabled = lookup("OWM_CACHE")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        config.cache = if enabled {
            let mut cache = CacheConfig::default();
            if let Some(size) = lookup("OWM_CACHE_SIZE") {
                cache.max_size = parse_number("OWM_CACHE_SIZE", &size)?;
            }
            if let Some(ttl) = lookup("OWM_CACHE_TTL_MS") {
                cache.item_lifetime_millis = parse_number("OWM_CACHE_TTL_MS", &ttl)?;
            }
            Some(cache)
        } else {
            None
        };

        Ok(config)
    }

    /// Checks the configuration before a client is built from it.
    pub fn validate(&self) -> Result<()> {
        self.validate_connection()?;
        if let Some(cache) = &self.cache {
            cache.validate()?;
        }
        Ok(())
    }

    /// Checks the settings every client needs, leaving `cache` aside.
    pub fn validate_connection(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(OwmError::ConfigError("API key is not set".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(OwmError::ConfigError("timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| OwmError::ConfigError(format!("{name} is not a valid number: {value:?}")))
}

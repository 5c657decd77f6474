//! Cache-through HTTP client.
//!
//! Builds the request URL, asks the cache for it, and only goes to the
//! network on a miss. Successful bodies are cached verbatim; error
//! responses never are.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use owm_cache::{LruCache, NullCache};
use owm_core::constants::API_KEY_PARAM;
use owm_core::error::{OwmError, Result};
use owm_core::traits::ResponseCache;

use crate::config::ClientConfig;

/// HTTP client for the weather API.
pub struct HttpClient {
    api_key: String,
    base_url: String,
    timeout_seconds: u64,
    default_params: Vec<(String, String)>,
    cache: Arc<dyn ResponseCache>,
    http_client: reqwest::Client,
}

impl HttpClient {
    /// Creates a client, building its cache from `config.cache`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let cache: Arc<dyn ResponseCache> = match &config.cache {
            Some(cache_config) => Arc::new(LruCache::<String>::with_config(cache_config.clone())?),
            None => Arc::new(NullCache),
        };
        Self::with_cache(config, cache)
    }

    /// Creates a client that uses the given cache, ignoring `config.cache`.
    pub fn with_cache(config: &ClientConfig, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        config.validate_connection()?;
        // Fail early on an unusable root rather than on the first request.
        Url::parse(&config.base_url)?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| OwmError::ConfigError(format!("failed to create HTTP client: {e}")))?;

        let mut default_params = vec![("lang".to_string(), config.language.clone())];
        if let Some(units) = &config.units {
            default_params.push(("units".to_string(), units.clone()));
        }

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
            default_params,
            cache,
            http_client,
        })
    }

    /// The cache consulted by this client.
    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Builds the full request URL for `endpoint`.
    ///
    /// Parameters are sorted by name (caller values override defaults) and
    /// the API key is appended last, so equal queries always map to the
    /// same URL and therefore the same cache key.
    pub fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url,
            endpoint.trim_start_matches('/')
        ))?;

        let mut query: BTreeMap<&str, &str> = self
            .default_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        for &(name, value) in params {
            query.insert(name, value);
        }

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &query {
                pairs.append_pair(name, value);
            }
            pairs.append_pair(API_KEY_PARAM, &self.api_key);
        }
        Ok(url)
    }

    /// Performs a GET against `endpoint`, returning the raw response body.
    #[instrument(skip(self))]
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = self.build_url(endpoint, params)?;

        if let Some(cached) = self.cache.get(url.as_str()) {
            debug!(endpoint, "Served from cache");
            return Ok(cached);
        }

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), "API call failed");
            return Err(match status.as_u16() {
                401 => OwmError::Unauthorized,
                404 => OwmError::NotFound(format!("{endpoint}: {body}")),
                code => OwmError::ApiCallError { status: code, body },
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        self.cache.set(url.as_str(), body.clone());
        debug!(endpoint, bytes = body.len(), "Fetched from API");
        Ok(body)
    }

    /// Performs a GET and deserializes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.get(endpoint, params).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn transport_error(&self, e: reqwest::Error) -> OwmError {
        if e.is_timeout() {
            OwmError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            // The request URL carries the API key.
            OwmError::HttpError(e.without_url().to_string())
        }
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("cache_size", &self.cache.size())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use owm_cache::CacheConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "test-key";

    fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig::new(KEY)
            .with_base_url(server.uri())
            .with_cache(CacheConfig::new(10, 60_000))
    }

    fn offline_client() -> HttpClient {
        HttpClient::new(&ClientConfig::new(KEY).with_base_url("http://localhost:1/data/2.5/"))
            .unwrap()
    }

    #[test]
    fn test_build_url_sorted_with_key_last() {
        let client = offline_client();
        let url = client.build_url("/weather", &[("q", "London"), ("cnt", "3")]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1/data/2.5/weather?cnt=3&lang=en&q=London&APPID=test-key"
        );
    }

    #[test]
    fn test_build_url_param_order_irrelevant() {
        let client = offline_client();
        let a = client.build_url("weather", &[("lat", "1"), ("lon", "2")]).unwrap();
        let b = client.build_url("weather", &[("lon", "2"), ("lat", "1")]).unwrap();
        let c = client.build_url("weather", &[("lat", "1"), ("lon", "3")]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_build_url_overrides_default_language() {
        let client = offline_client();
        let url = client.build_url("weather", &[("lang", "fr")]).unwrap();
        assert!(url.as_str().contains("lang=fr"));
        assert!(!url.as_str().contains("lang=en"));
    }

    #[test]
    fn test_build_url_encodes_values() {
        let client = offline_client();
        let url = client.build_url("weather", &[("q", "São Paulo,BR")]).unwrap();
        assert!(url.as_str().contains("q=S%C3%A3o+Paulo%2CBR"));
    }

    #[test]
    fn test_rejects_missing_api_key() {
        let result = HttpClient::new(&ClientConfig::default());
        assert!(matches!(result, Err(OwmError::ConfigError(_))));
    }

    #[test]
    fn test_with_cache_rejects_zero_timeout() {
        let config = ClientConfig::new(KEY).with_timeout(0);
        let result = HttpClient::with_cache(&config, Arc::new(NullCache));
        assert!(matches!(result, Err(OwmError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let client = offline_client();
        match client.get("weather", &[("q", "Oslo")]).await {
            Err(OwmError::HttpError(message)) => assert!(!message.contains(KEY), "{message}"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_invalid_cache_config() {
        let config = ClientConfig::new(KEY).with_cache(CacheConfig::new(5, 0));
        assert!(matches!(HttpClient::new(&config), Err(OwmError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = ClientConfig::new(KEY).with_base_url("not a url");
        assert!(matches!(HttpClient::new(&config), Err(OwmError::UrlError(_))));
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("APPID", KEY))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"cod":200}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&config_for(&server)).unwrap();
        let first = client.get("weather", &[("q", "London")]).await.unwrap();
        let second = client.get("weather", &[("q", "London")]).await.unwrap();

        assert_eq!(first, r#"{"cod":200}"#);
        assert_eq!(first, second);
        assert_eq!(client.cache().size(), 1);
    }

    #[tokio::test]
    async fn test_distinct_params_not_shared() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Rome"))
            .respond_with(ResponseTemplate::new(200).set_body_string("rome"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Milan"))
            .respond_with(ResponseTemplate::new(200).set_body_string("milan"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&config_for(&server)).unwrap();
        assert_eq!(client.get("weather", &[("q", "Rome")]).await.unwrap(), "rome");
        assert_eq!(client.get("weather", &[("q", "Milan")]).await.unwrap(), "milan");
        assert_eq!(client.get("weather", &[("q", "Rome")]).await.unwrap(), "rome");
        assert_eq!(client.cache().size(), 2);
    }

    #[tokio::test]
    async fn test_no_cache_always_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(2)
            .mount(&server)
            .await;

        let client = HttpClient::new(&config_for(&server).no_cache()).unwrap();
        client.get("weather", &[("q", "Paris")]).await.unwrap();
        client.get("weather", &[("q", "Paris")]).await.unwrap();
        assert_eq!(client.cache().size(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"cod":401}"#))
            .expect(2)
            .mount(&server)
            .await;

        let client = HttpClient::new(&config_for(&server)).unwrap();
        for _ in 0..2 {
            let err = client.get("weather", &[("q", "Oslo")]).await.unwrap_err();
            assert!(matches!(err, OwmError::Unauthorized));
        }
        assert_eq!(client.cache().size(), 0);
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
            .mount(&server)
            .await;

        let client = HttpClient::new(&config_for(&server)).unwrap();
        let err = client.get("weather", &[("q", "Atlantis")]).await.unwrap_err();
        match err {
            OwmError::NotFound(msg) => assert!(msg.contains("city not found")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_recoverable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let client = HttpClient::new(&config_for(&server)).unwrap();
        let err = client.get("weather", &[("q", "Oslo")]).await.unwrap_err();
        assert!(matches!(err, OwmError::ApiCallError { status: 503, .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = HttpClient::new(&config_for(&server).with_timeout(1)).unwrap();
        let err = client.get("weather", &[("q", "Oslo")]).await.unwrap_err();
        assert!(matches!(err, OwmError::Timeout { seconds: 1 }));
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"Lisbon","id":2267057}"#))
            .mount(&server)
            .await;

        #[derive(serde::Deserialize)]
        struct Place {
            name: String,
            id: u64,
        }

        let client = HttpClient::new(&config_for(&server)).unwrap();
        let place: Place = client.get_json("weather", &[("q", "Lisbon")]).await.unwrap();
        assert_eq!(place.name, "Lisbon");
        assert_eq!(place.id, 2267057);

        let bad: Result<Vec<u8>> = client.get_json("weather", &[("q", "Lisbon")]).await;
        assert!(matches!(bad, Err(OwmError::JsonError(_))));
    }
}

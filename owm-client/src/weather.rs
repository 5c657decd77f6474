//! Endpoint helpers for current weather, forecasts, and air pollution.
//!
//! Payloads are returned as raw JSON text, exactly as the API (or the
//! cache) produced them.

use std::sync::Arc;

use tracing::instrument;

use owm_core::constants::{ENDPOINT_AIR_POLLUTION, ENDPOINT_FORECAST, ENDPOINT_WEATHER};
use owm_core::error::Result;
use owm_core::traits::ResponseCache;

use crate::config::ClientConfig;
use crate::geo;
use crate::http::HttpClient;

/// High-level weather client.
#[derive(Debug)]
pub struct WeatherClient {
    http: HttpClient,
}

impl WeatherClient {
    /// Creates a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// Creates a client that shares an existing cache.
    pub fn with_cache(config: &ClientConfig, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::with_cache(config, cache)?,
        })
    }

    /// Underlying HTTP client, for endpoints without a helper.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Current weather at a place name such as "London,GB".
    #[instrument(skip(self))]
    pub async fn current_weather_at_place(&self, place: &str) -> Result<String> {
        let place = geo::normalize_place(place)?;
        self.http.get(ENDPOINT_WEATHER, &[("q", place)]).await
    }

    /// Current weather at the given coordinates.
    #[instrument(skip(self))]
    pub async fn current_weather_at_coords(&self, lat: f64, lon: f64) -> Result<String> {
        self.get_at_coords(ENDPOINT_WEATHER, lat, lon).await
    }

    /// 5 day / 3 hour forecast at a place name.
    #[instrument(skip(self))]
    pub async fn forecast_at_place(&self, place: &str) -> Result<String> {
        let place = geo::normalize_place(place)?;
        self.http.get(ENDPOINT_FORECAST, &[("q", place)]).await
    }

    /// 5 day / 3 hour forecast at the given coordinates.
    #[instrument(skip(self))]
    pub async fn forecast_at_coords(&self, lat: f64, lon: f64) -> Result<String> {
        self.get_at_coords(ENDPOINT_FORECAST, lat, lon).await
    }

    /// Air pollution index at the given coordinates.
    #[instrument(skip(self))]
    pub async fn air_pollution_at_coords(&self, lat: f64, lon: f64) -> Result<String> {
        self.get_at_coords(ENDPOINT_AIR_POLLUTION, lat, lon).await
    }

    async fn get_at_coords(&self, endpoint: &str, lat: f64, lon: f64) -> Result<String> {
        geo::validate_coords(lat, lon)?;
        let lat = lat.to_string();
        let lon = lon.to_string();
        self.http
            .get(endpoint, &[("lat", lat.as_str()), ("lon", lon.as_str())])
            .await
    }
}

//! # OWM Client
//!
//! HTTP access to the weather API. Every GET goes through a
//! [`ResponseCache`](owm_core::ResponseCache) keyed by the fully-resolved
//! request URL: the cache is consulted before the network and populated
//! after each successful response.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
pub mod geo;
mod http;
mod weather;

pub use config::ClientConfig;
pub use http::HttpClient;
pub use weather::WeatherClient;

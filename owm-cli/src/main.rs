//! owm CLI
//!
//! Command-line access to the weather API through the caching client.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use owm_cache::{CacheStats, LruCache, NullCache};
use owm_client::{ClientConfig, WeatherClient};
use owm_core::traits::ResponseCache;

/// owm - weather API client with response caching
#[derive(Parser)]
#[command(name = "owm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key
    #[arg(long, env = "OWM_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Unit system (metric, imperial)
    #[arg(long, global = true)]
    units: Option<String>,

    /// Maximum number of cached responses
    #[arg(long, global = true)]
    cache_size: Option<usize>,

    /// Lifetime of a cached response in milliseconds
    #[arg(long, global = true)]
    cache_ttl_ms: Option<u64>,

    /// Disable the response cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Issue the same request this many times
    #[arg(short, long, global = true, default_value = "1")]
    repeat: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current weather at a place ("London,GB")
    Weather {
        /// Place name
        place: String,
    },

    /// 5 day / 3 hour forecast at a place
    Forecast {
        /// Place name
        place: String,
    },

    /// Current weather at coordinates
    Coords {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Air pollution index at coordinates
    Pollution {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "owm=debug,info"
    } else {
        "owm=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _ = dotenvy::dotenv();
    let config = build_config(&cli, |name| std::env::var(name).ok())?;
    let lru = match &config.cache {
        Some(cache_config) => Some(Arc::new(
            LruCache::<String>::with_config(cache_config.clone())
                .context("Invalid cache configuration")?,
        )),
        None => None,
    };
    let cache: Arc<dyn ResponseCache> = match &lru {
        Some(lru) => lru.clone(),
        None => Arc::new(NullCache),
    };

    let client = WeatherClient::with_cache(&config, cache).context("Failed to create client")?;

    for round in 1..=cli.repeat.max(1) {
        let started = std::time::Instant::now();
        let payload = run(&client, &cli.command).await?;
        if round == 1 {
            print_payload(&payload)?;
        }
        println!(
            "{} request {} took {:?}",
            "⏱".dimmed(),
            round,
            started.elapsed()
        );
    }

    match &lru {
        Some(lru) => print_stats(&lru.stats()),
        None => println!("{}", "Cache disabled".yellow()),
    }

    Ok(())
}

/// Variables from `lookup` first, flags on top
fn build_config(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_lookup(lookup).context("Failed to read configuration")?;

    if let Some(key) = &cli.api_key {
        config.api_key = key.clone();
    }
    if let Some(units) = &cli.units {
        config.units = Some(units.clone());
    }
    if cli.no_cache {
        config.cache = None;
    } else if cli.cache_size.is_some() || cli.cache_ttl_ms.is_some() {
        let mut cache = config.cache.clone().unwrap_or_default();
        if let Some(size) = cli.cache_size {
            cache.max_size = size;
        }
        if let Some(ttl) = cli.cache_ttl_ms {
            cache.item_lifetime_millis = ttl;
        }
        config.cache = Some(cache);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(client: &WeatherClient, command: &Commands) -> Result<String> {
    let payload = match command {
        Commands::Weather { place } => client
            .current_weather_at_place(place)
            .await
            .with_context(|| format!("Failed to fetch weather for {place}"))?,
        Commands::Forecast { place } => client
            .forecast_at_place(place)
            .await
            .with_context(|| format!("Failed to fetch forecast for {place}"))?,
        Commands::Coords { lat, lon } => client
            .current_weather_at_coords(*lat, *lon)
            .await
            .context("Failed to fetch weather at coordinates")?,
        Commands::Pollution { lat, lon } => client
            .air_pollution_at_coords(*lat, *lon)
            .await
            .context("Failed to fetch air pollution")?,
    };
    Ok(payload)
}

fn print_payload(payload: &str) -> Result<()> {
    println!("{}", "✅ Response:".green().bold());
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{payload}"),
    }
    Ok(())
}

fn print_stats(stats: &CacheStats) {
    println!("\n{}", "📦 Cache:".cyan().bold());
    println!("   {} {}/{}", "Entries:".dimmed(), stats.size, stats.capacity);
    println!("   {} {}", "Hits:".dimmed(), stats.hits);
    println!("   {} {}", "Misses:".dimmed(), stats.misses);
    println!("   {} {:.0}%", "Hit rate:".dimmed(), stats.hit_rate() * 100.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_cli_parses_negative_coords() {
        let cli = Cli::try_parse_from(["owm", "coords", "--lat", "-33.87", "--lon", "151.21"]).unwrap();
        match cli.command {
            Commands::Coords { lat, lon } => {
                assert_eq!(lat, -33.87);
                assert_eq!(lon, 151.21);
            }
            _ => panic!("expected coords command"),
        }
    }

    #[test]
    fn test_cli_cache_flags() {
        let cli = Cli::try_parse_from([
            "owm", "weather", "Oslo", "--api-key", "k", "--cache-size", "5", "--cache-ttl-ms", "900",
        ])
        .unwrap();
        let config = build_config(&cli, no_env).unwrap();
        assert_eq!(config.api_key, "k");
        let cache = config.cache.unwrap();
        assert_eq!(cache.max_size, 5);
        assert_eq!(cache.item_lifetime_millis, 900);
    }

    #[test]
    fn test_cli_rejects_zero_cache_size() {
        let cli = Cli::try_parse_from(["owm", "weather", "Oslo", "--api-key", "k", "--cache-size", "0"]).unwrap();
        assert!(build_config(&cli, no_env).is_err());
    }

    #[test]
    fn test_cli_flags_override_lookup() {
        let cli = Cli::try_parse_from(["owm", "weather", "Oslo", "--api-key", "k", "--cache-size", "7"]).unwrap();
        let config = build_config(&cli, |name: &str| match name {
            "OWM_API_KEY" => Some("from-env".to_string()),
            "OWM_UNITS" => Some("imperial".to_string()),
            "OWM_CACHE_SIZE" => Some("3".to_string()),
            "OWM_CACHE_TTL_MS" => Some("1234".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.units.as_deref(), Some("imperial"));
        let cache = config.cache.unwrap();
        assert_eq!(cache.max_size, 7);
        assert_eq!(cache.item_lifetime_millis, 1234);
    }

    #[test]
    fn test_cli_reports_bad_lookup_value() {
        let cli = Cli::try_parse_from(["owm", "weather", "Oslo", "--api-key", "k"]).unwrap();
        let result = build_config(&cli, |name: &str| (name == "OWM_TIMEOUT").then(|| "soon".to_string()));
        assert!(result.is_err());
        assert!(build_config(&cli, no_env).is_ok());
    }

    #[test]
    fn test_cli_no_cache_wins_over_lookup() {
        let cli = Cli::try_parse_from(["owm", "weather", "Oslo", "--api-key", "k", "--no-cache"]).unwrap();
        let config = build_config(&cli, |name: &str| (name == "OWM_CACHE_SIZE").then(|| "9".to_string())).unwrap();
        assert!(config.cache.is_none());
    }
}

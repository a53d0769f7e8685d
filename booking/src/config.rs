//! Configuration management for the booking flow.
//!
//! Loads configuration from environment variables with defaults matching a local
//! development API.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Remote Gateway base path
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
/// Push channel endpoint
pub const DEFAULT_PRICE_FEED_URL: &str = "ws://localhost:8080/ws/prices";

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Remote Gateway configuration
    pub api: ApiConfig,
    /// Live price feed configuration
    pub price_feed: PriceFeedConfig,
    /// How long the "price updating" flag stays on a flight card
    pub price_flash: Duration,
    /// Grace period for in-flight effects on unmount
    pub shutdown_timeout: Duration,
}

/// Remote Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Automatic retries for idempotent reads (seat map, flight, booking lookup)
    pub read_retries: u32,
}

/// Price feed configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeedConfig {
    /// WebSocket endpoint
    pub url: String,
    /// Flat delay before every reconnect attempt
    pub reconnect_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                request_timeout: Duration::from_secs(30),
                read_retries: 1,
            },
            price_feed: PriceFeedConfig {
                url: DEFAULT_PRICE_FEED_URL.to_string(),
                reconnect_delay: Duration::from_millis(3000),
            },
            price_flash: Duration::from_millis(2000),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable is set but unparseable, or
    /// if the request timeout or reconnect delay is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            api: ApiConfig {
                base_url: lookup("SKYBOOK_API_BASE_URL").unwrap_or(defaults.api.base_url),
                request_timeout: parse_positive(&lookup, "SKYBOOK_REQUEST_TIMEOUT_SECS", 30)
                    .map(Duration::from_secs)?,
                read_retries: parse_or(&lookup, "SKYBOOK_SEAT_FETCH_RETRIES", 1)?,
            },
            price_feed: PriceFeedConfig {
                url: lookup("SKYBOOK_PRICE_FEED_URL").unwrap_or(defaults.price_feed.url),
                reconnect_delay: parse_positive(&lookup, "SKYBOOK_RECONNECT_DELAY_MS", 3000)
                    .map(Duration::from_millis)?,
            },
            price_flash: parse_or(&lookup, "SKYBOOK_PRICE_FLASH_MS", 2000)
                .map(Duration::from_millis)?,
            shutdown_timeout: parse_or(&lookup, "SKYBOOK_SHUTDOWN_TIMEOUT_SECS", 5)
                .map(Duration::from_secs)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value: raw,
        }),
    }
}

/// Like [`parse_or`], but zero is rejected
fn parse_positive<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: "0".into(),
            reason: "must be greater than zero".into(),
        }),
        value => Ok(value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.price_feed.reconnect_delay, Duration::from_secs(3));
        assert_eq!(config.api.read_retries, 1);
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("SKYBOOK_API_BASE_URL", "https://api.skybook.test/api"),
            ("SKYBOOK_PRICE_FEED_URL", "wss://api.skybook.test/ws/prices"),
            ("SKYBOOK_RECONNECT_DELAY_MS", "500"),
            ("SKYBOOK_SEAT_FETCH_RETRIES", " 0 "),
            ("SKYBOOK_SHUTDOWN_TIMEOUT_SECS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.skybook.test/api");
        assert_eq!(config.price_feed.url, "wss://api.skybook.test/ws/prices");
        assert_eq!(config.price_feed.reconnect_delay, Duration::from_millis(500));
        assert_eq!(config.api.read_retries, 0);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
        assert_eq!(config.price_flash, Duration::from_secs(2));
    }

    #[test]
    fn unparseable_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("SKYBOOK_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, "SKYBOOK_REQUEST_TIMEOUT_SECS");
                assert_eq!(value, "soon");
            }
        }
    }

    #[test]
    fn zero_timeout_or_reconnect_delay_is_rejected() {
        for key in ["SKYBOOK_REQUEST_TIMEOUT_SECS", "SKYBOOK_RECONNECT_DELAY_MS"] {
            let err = Config::from_lookup(lookup(&[(key, "0")])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    key,
                    value: "0".into(),
                    reason: "must be greater than zero".into(),
                }
            );
        }

        // Zero retries stays valid
        let config = Config::from_lookup(lookup(&[("SKYBOOK_SEAT_FETCH_RETRIES", "0")])).unwrap();
        assert_eq!(config.api.read_retries, 0);
    }
}

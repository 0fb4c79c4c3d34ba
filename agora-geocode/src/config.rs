//! Geocoder configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use agora_cache::CacheConfig;
use agora_core::constants::{
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
    NOMINATIM_BASE_URL, NOMINATIM_MIN_INTERVAL_MS,
};
use agora_core::error::{AgoraError, Result};

/// Geocoding client configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    /// Service base URL (e.g., "https://nominatim.openstreetmap.org")
    pub base_url: String,
    /// `User-Agent` sent with every request
    pub user_agent: String,
    /// Minimum spacing between request starts, in milliseconds
    pub min_interval_ms: u64,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Whether search results are cached by query
    pub enable_cache: bool,
    /// Cache TTL in seconds
    pub cache_ttl_seconds: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_BASE_URL.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            min_interval_ms: NOMINATIM_MIN_INTERVAL_MS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            enable_cache: false,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

impl GeocodeConfig {
    /// Creates a configuration pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the `User-Agent`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the minimum spacing between request starts.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enables result caching with the given TTL.
    pub fn with_cache(mut self, ttl_seconds: u64) -> Self {
        self.enable_cache = true;
        self.cache_ttl_seconds = ttl_seconds;
        self
    }

    /// Loads configuration from the environment (and `.env`, if present).
    ///
    /// | variable                  | field               |
    /// |---------------------------|---------------------|
    /// | `AGORA_GEOCODE_URL`       | `base_url`          |
    /// | `AGORA_USER_AGENT`        | `user_agent`        |
    /// | `AGORA_MIN_INTERVAL_MS`   | `min_interval_ms`   |
    /// | `AGORA_TIMEOUT_SECONDS`   | `timeout_seconds`   |
    /// | `AGORA_ENABLE_CACHE`      | `enable_cache`      |
    /// | `AGORA_CACHE_TTL_SECONDS` | `cache_ttl_seconds` |
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from a variable lookup, starting from defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("AGORA_GEOCODE_URL") {
            config.base_url = url;
        }
        if let Some(agent) = lookup("AGORA_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(ms) = parse_u64(&lookup, "AGORA_MIN_INTERVAL_MS")? {
            config.min_interval_ms = ms;
        }
        if let Some(secs) = parse_u64(&lookup, "AGORA_TIMEOUT_SECONDS")? {
            config.timeout_seconds = secs;
        }
        if let Some(flag) = lookup("AGORA_ENABLE_CACHE") {
            config.enable_cache = flag != "false" && flag != "0";
        }
        if let Some(secs) = parse_u64(&lookup, "AGORA_CACHE_TTL_SECONDS")? {
            config.cache_ttl_seconds = secs;
        }

        Ok(config)
    }

    /// Returns the minimum spacing between request starts.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Returns the cache configuration for search results.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl_seconds: self.cache_ttl_seconds,
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AgoraError::ConfigError(format!("{} is not a number: {:?}", name, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GeocodeConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.min_interval(), Duration::from_millis(1000));
        assert!(!config.enable_cache);
        assert!(config.user_agent.starts_with("agora/"));
    }

    #[test]
    fn test_builder() {
        let config = GeocodeConfig::new("http://localhost:8080")
            .with_user_agent("test-agent")
            .with_min_interval(Duration::from_millis(250))
            .with_cache(60);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.min_interval_ms, 250);
        assert!(config.enable_cache);
        assert_eq!(config.cache_config().ttl_ms(), 60_000);
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = GeocodeConfig::from_vars(vars(&[
            ("AGORA_GEOCODE_URL", "http://geo.local"),
            ("AGORA_MIN_INTERVAL_MS", "1500"),
            ("AGORA_ENABLE_CACHE", "true"),
            ("AGORA_CACHE_TTL_SECONDS", " 120 "),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://geo.local");
        assert_eq!(config.min_interval_ms, 1500);
        assert!(config.enable_cache);
        assert_eq!(config.cache_ttl_seconds, 120);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_from_vars_cache_flag_off() {
        let config = GeocodeConfig::from_vars(vars(&[("AGORA_ENABLE_CACHE", "0")])).unwrap();
        assert!(!config.enable_cache);
    }

    #[test]
    fn test_from_vars_rejects_bad_number() {
        let err = GeocodeConfig::from_vars(vars(&[("AGORA_TIMEOUT_SECONDS", "soon")])).unwrap_err();
        assert!(matches!(err, AgoraError::ConfigError(_)));
    }

    #[test]
    fn test_partial_json() {
        let config: GeocodeConfig =
            serde_json::from_str(r#"{"user_agent": "campus-map/2.0"}"#).unwrap();
        assert_eq!(config.user_agent, "campus-map/2.0");
        assert_eq!(config.min_interval_ms, 1000);
    }
}

//! Query-keyed result cache in front of a geocoder.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use agora_cache::{CacheConfig, CacheStats, Clock, MonotonicClock, TtlInMemoryCache};
use agora_core::error::Result;
use agora_core::traits::Geocoder;
use agora_core::types::Location;

use crate::config::GeocodeConfig;
use crate::nominatim::NominatimClient;

/// Geocoder that remembers successful results by query.
///
/// Queries are normalized (trimmed, lowercased) before lookup, so
/// `"EPFL"` and `" epfl "` share one entry. A hit never touches the inner
/// geocoder, and therefore never waits on its throttle. Failures are passed
/// through and not cached.
///
/// Two concurrent misses on the same query both reach the inner geocoder.
pub struct CachedGeocoder<G, C = MonotonicClock> {
    inner: G,
    cache: TtlInMemoryCache<String, Vec<Location>, C>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Wraps `inner` with a cache built from `config`.
    pub fn new(inner: G, config: &CacheConfig) -> Self {
        Self::with_cache(inner, TtlInMemoryCache::from_config(config))
    }
}

impl<G: Geocoder, C: Clock> CachedGeocoder<G, C> {
    /// Wraps `inner` with an existing cache.
    pub fn with_cache(inner: G, cache: TtlInMemoryCache<String, Vec<Location>, C>) -> Self {
        Self { inner, cache }
    }

    /// Returns the wrapped geocoder.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Drops the cached result for `query`.
    pub fn invalidate(&self, query: &str) {
        self.cache.invalidate(&normalize_query(query));
    }

    /// Drops every cached result.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[async_trait]
impl<G: Geocoder, C: Clock> Geocoder for CachedGeocoder<G, C> {
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        let key = normalize_query(query);

        if let Some(hit) = self.cache.peek(&key) {
            debug!(query, "Cache hit");
            return Ok(hit);
        }

        debug!(query, "Cache miss, searching");
        let found = self.inner.search(query).await?;
        self.cache.put(key, found.clone());
        Ok(found)
    }
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Builds the geocoder described by `config`: a [`NominatimClient`],
/// wrapped in a [`CachedGeocoder`] when caching is enabled.
pub fn build_geocoder(config: GeocodeConfig) -> Result<Arc<dyn Geocoder>> {
    let cache = config.enable_cache.then(|| config.cache_config());
    let client = NominatimClient::with_config(config)?;

    let geocoder: Arc<dyn Geocoder> = match cache {
        Some(cache_config) => Arc::new(CachedGeocoder::new(client, &cache_config)),
        None => Arc::new(client),
    };
    Ok(geocoder)
}

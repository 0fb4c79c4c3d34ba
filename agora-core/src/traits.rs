//! Common traits for Agora.
//!
//! These traits define the interfaces that different implementations can satisfy,
//! enabling modularity and testing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Location;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Key/value cache contract.
///
/// Repositories wrap calls to a slower source of truth with a cache so the
/// same read is not repeated. Implementations differ in how they store
/// entries and in what makes an entry valid (none, TTL, ...), but callers only
/// ever see this interface.
///
/// Every operation is total: a missing or expired key is `None`, never an error.
pub trait Cache<K, V>: Send + Sync {
    /// Returns the value for `key` if it is present and still valid.
    ///
    /// An entry that is present but no longer valid is removed, so stale data
    /// is never handed out twice.
    fn peek(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: K, value: V);

    /// Removes the entry for `key`. No-op if absent.
    fn invalidate(&self, key: &K);

    /// Removes every entry.
    fn invalidate_all(&self);
}

impl<K, V, C> Cache<K, V> for Arc<C>
where
    C: Cache<K, V> + ?Sized,
{
    fn peek(&self, key: &K) -> Option<V> {
        (**self).peek(key)
    }

    fn put(&self, key: K, value: V) {
        (**self).put(key, value)
    }

    fn invalidate(&self, key: &K) {
        (**self).invalidate(key)
    }

    fn invalidate_all(&self) {
        (**self).invalidate_all()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GEOCODER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for forward geocoding (free-form text to locations).
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Searches for locations matching `query`.
    ///
    /// Returns the complete list of matches or an error; never a partial list.
    async fn search(&self, query: &str) -> Result<Vec<Location>>;
}

#[async_trait]
impl<G> Geocoder for Arc<G>
where
    G: Geocoder + ?Sized,
{
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        (**self).search(query).await
    }
}

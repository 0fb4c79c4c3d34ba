//! Policy-driven in-memory cache.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use agora_core::traits::Cache;

use crate::clock::{Clock, MonotonicClock};
use crate::policy::{AlwaysValid, CacheConfig, TtlPolicy, ValidityPolicy};
use crate::storage::{Entry, MapStorage, Storage};

/// Cache whose entries never expire.
pub type InMemoryCache<K, V> = PolicyCache<K, V, AlwaysValid, MapStorage<K, V, ()>>;

/// Cache whose entries expire a fixed time after their last `put`.
pub type TtlInMemoryCache<K, V, C = MonotonicClock> =
    PolicyCache<K, V, TtlPolicy<C>, MapStorage<K, V, u64>>;

/// A cache assembled from a validity policy `P` and a storage mechanism `S`.
///
/// `peek` is where the two meet: it reads the slot from storage, asks the
/// policy whether it is still valid, and removes it if not. The whole
/// sequence runs under one lock, so an instance can be shared across
/// threads.
pub struct PolicyCache<K, V, P, S> {
    storage: Mutex<S>,
    policy: P,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    _marker: PhantomData<fn(K, V)>,
}

enum Lookup<V> {
    Missing,
    Fresh(V),
    Stale,
}

impl<K, V, P, S> PolicyCache<K, V, P, S>
where
    K: Eq + Hash,
    V: Clone,
    P: ValidityPolicy<K, V>,
    S: Storage<K, V, P::Meta>,
{
    /// Assembles a cache from a policy and a storage.
    pub fn with_parts(policy: P, storage: S) -> Self {
        Self {
            storage: Mutex::new(storage),
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    /// Returns the validity policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the value for `key` if present and valid, removing it if it
    /// is present but invalid.
    pub fn peek(&self, key: &K) -> Option<V> {
        let mut storage = self.storage.lock();

        let lookup = match storage.read(key) {
            None => Lookup::Missing,
            Some(entry) if self.policy.is_valid(key, &entry.value, &entry.meta) => {
                Lookup::Fresh(entry.value.clone())
            }
            Some(_) => Lookup::Stale,
        };

        match lookup {
            Lookup::Fresh(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Lookup::Stale => {
                storage.remove(key);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!("evicted expired cache entry");
                None
            }
            Lookup::Missing => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores `value` under `key`, replacing any previous entry and its
    /// metadata.
    pub fn put(&self, key: K, value: V) {
        let meta = self.policy.stamp(&key, &value);
        self.storage.lock().write(key, Entry::new(value, meta));
    }

    /// Removes the entry for `key`, if any.
    pub fn invalidate(&self, key: &K) {
        self.storage.lock().remove(key);
    }

    /// Removes every entry.
    pub fn invalidate_all(&self) {
        self.storage.lock().clear();
    }

    /// Removes every entry the policy no longer accepts.
    ///
    /// Expiry is otherwise lazy; this is only for callers that want to bound
    /// memory held by keys that are never read again. Returns the number of
    /// entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut storage = self.storage.lock();
        let before = storage.len();
        let policy = &self.policy;
        storage.retain(&mut |key, entry| policy.is_valid(key, &entry.value, &entry.meta));
        let removed = before - storage.len();

        if removed > 0 {
            self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
            trace!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet observed.
    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.storage.lock().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}

impl<K, V, P, S> Cache<K, V> for PolicyCache<K, V, P, S>
where
    K: Eq + Hash,
    V: Clone,
    P: ValidityPolicy<K, V>,
    S: Storage<K, V, P::Meta>,
{
    fn peek(&self, key: &K) -> Option<V> {
        PolicyCache::peek(self, key)
    }

    fn put(&self, key: K, value: V) {
        PolicyCache::put(self, key, value)
    }

    fn invalidate(&self, key: &K) {
        PolicyCache::invalidate(self, key)
    }

    fn invalidate_all(&self) {
        PolicyCache::invalidate_all(self)
    }
}

impl<K, V> InMemoryCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::with_parts(AlwaysValid, MapStorage::new())
    }
}

impl<K, V> Default for InMemoryCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> TtlInMemoryCache<K, V, C>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
    C: Clock,
{
    /// Creates an empty cache with the given TTL, reading time from `clock`.
    pub fn new(ttl_ms: u64, clock: C) -> Self {
        Self::with_parts(TtlPolicy::new(ttl_ms, clock), MapStorage::new())
    }

    /// Returns the TTL in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.policy().ttl_ms()
    }
}

impl<K, V> TtlInMemoryCache<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    /// Creates an empty cache with the given TTL on a monotonic clock.
    pub fn with_ttl(ttl_ms: u64) -> Self {
        Self::new(ttl_ms, MonotonicClock::new())
    }

    /// Creates an empty cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_ttl(config.ttl_ms())
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Stored entries (including expired ones not yet observed)
    pub entries: usize,
    /// `peek` calls that returned a value
    pub hits: u64,
    /// `peek` calls that returned nothing
    pub misses: u64,
    /// Entries removed because they were no longer valid
    pub expirations: u64,
}

impl CacheStats {
    /// Fraction of `peek` calls that hit, or 0 when there were none.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

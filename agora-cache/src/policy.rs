//! Validity policies.

use serde::{Deserialize, Serialize};

use agora_core::constants::DEFAULT_CACHE_TTL_SECONDS;

use crate::clock::{Clock, MonotonicClock};

/// Decides whether a stored entry may still be served.
///
/// `stamp` runs once per `put` and its output is stored next to the value.
/// `is_valid` must be a pure read: the cache owns removal.
pub trait ValidityPolicy<K, V>: Send + Sync {
    /// Per-entry metadata recorded at write time.
    type Meta: Send;

    /// Computes the metadata for an entry being written.
    fn stamp(&self, key: &K, value: &V) -> Self::Meta;

    /// Returns true if the entry may be served.
    fn is_valid(&self, key: &K, value: &V, meta: &Self::Meta) -> bool;
}

/// Entries never expire.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysValid;

impl<K, V> ValidityPolicy<K, V> for AlwaysValid {
    type Meta = ();

    fn stamp(&self, _key: &K, _value: &V) -> Self::Meta {}

    fn is_valid(&self, _key: &K, _value: &V, _meta: &Self::Meta) -> bool {
        true
    }
}

/// Entries expire a fixed number of milliseconds after they were written.
///
/// An entry stored at `t` is valid on `[t, t + ttl)`: at exactly `t + ttl`
/// it is expired. A `ttl` of zero expires everything immediately.
#[derive(Clone, Debug)]
pub struct TtlPolicy<C = MonotonicClock> {
    ttl_ms: u64,
    clock: C,
}

impl<C: Clock> TtlPolicy<C> {
    /// Creates a policy with the given TTL and clock.
    pub fn new(ttl_ms: u64, clock: C) -> Self {
        Self { ttl_ms, clock }
    }

    /// Returns the TTL in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Returns the clock the policy reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<K, V, C: Clock> ValidityPolicy<K, V> for TtlPolicy<C> {
    /// Insertion time in clock milliseconds.
    type Meta = u64;

    fn stamp(&self, _key: &K, _value: &V) -> Self::Meta {
        self.clock.now_ms()
    }

    fn is_valid(&self, _key: &K, _value: &V, stored_at: &Self::Meta) -> bool {
        self.clock.now_ms().saturating_sub(*stored_at) < self.ttl_ms
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry TTL in seconds
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    /// Returns the TTL in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_seconds.saturating_mul(1000)
    }
}

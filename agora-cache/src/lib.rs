//! # Agora Cache
//!
//! In-memory caches built from two independent parts:
//!
//! - a [`Storage`] mechanism that keeps slots (`MapStorage`), and
//! - a [`ValidityPolicy`] that decides whether a slot may be served
//!   (`AlwaysValid`, `TtlPolicy`).
//!
//! [`PolicyCache`] combines them and implements [`agora_core::Cache`].
//! Expiry is lazy: an invalid entry is removed when `peek` observes it.
//!
//! ## Example
//!
//! ```rust
//! use agora_cache::{ManualClock, TtlInMemoryCache};
//!
//! let clock = ManualClock::new(0);
//! let cache: TtlInMemoryCache<&str, u32, _> = TtlInMemoryCache::new(1_000, clock.clone());
//!
//! cache.put("answer", 42);
//! clock.advance(999);
//! assert_eq!(cache.peek(&"answer"), Some(42));
//! clock.advance(1);
//! assert_eq!(cache.peek(&"answer"), None);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod clock;
mod policy;
mod storage;

pub use cache::{CacheStats, InMemoryCache, PolicyCache, TtlInMemoryCache};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use policy::{AlwaysValid, CacheConfig, TtlPolicy, ValidityPolicy};
pub use storage::{Entry, MapStorage, Storage};

pub use agora_core::traits::Cache;

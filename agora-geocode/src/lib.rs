//! # Agora Geocode
//!
//! Forward geocoding against Nominatim, throttled to the service's
//! one-request-per-second policy.
//!
//! - [`RequestThrottle`]: async, mutex-guarded minimum spacing between
//!   request starts
//! - [`NominatimClient`]: `search(query)` over HTTP, one throttle per client
//! - [`CachedGeocoder`]: optional query-keyed TTL cache in front of any
//!   [`Geocoder`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use agora_geocode::{GeocodeConfig, NominatimClient};
//!
//! let client = NominatimClient::with_config(
//!     GeocodeConfig::default().with_user_agent("campus-map/1.0 (ops@example.org)"),
//! )?;
//! let places = client.search("EPFL").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cached;
mod config;
mod nominatim;
mod throttle;

pub use cached::{build_geocoder, CachedGeocoder};
pub use config::GeocodeConfig;
pub use nominatim::{parse_places, NominatimClient, NominatimPlace};
pub use throttle::RequestThrottle;

pub use agora_core::traits::Geocoder;

//! Shared constants for Agora.
//!
//! Service endpoints and policy limits used by the geocoder, plus the cache
//! defaults.

// ═══════════════════════════════════════════════════════════════════════════════
// GEOCODING SERVICE
// ═══════════════════════════════════════════════════════════════════════════════

/// Public Nominatim instance.
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Path of the free-form search endpoint, relative to the base URL.
pub const NOMINATIM_SEARCH_PATH: &str = "search";

/// Minimum spacing between two requests to the public instance, in milliseconds.
/// The usage policy allows at most one request per second.
pub const NOMINATIM_MIN_INTERVAL_MS: u64 = 1000;

/// Default `User-Agent`. The usage policy rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("agora/", env!("CARGO_PKG_VERSION"));

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default TTL for cached entries in seconds (1 hour).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

// ═══════════════════════════════════════════════════════════════════════════════
// COORDINATES
// ═══════════════════════════════════════════════════════════════════════════════

/// Largest absolute latitude, in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Largest absolute longitude, in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

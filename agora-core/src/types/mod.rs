//! Domain types for Agora.
//!
//! - [`Location`]: A geocoded point with its human-readable name

mod location;

pub use location::*;

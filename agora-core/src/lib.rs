//! # Agora Core
//!
//! Core types, errors, and traits shared by the Agora crates.
//!
//! - **Types**: [`Location`], the result of a geocoding search
//! - **Errors**: [`AgoraError`] with transport/config classification
//! - **Constants**: Service endpoints, policy limits, cache defaults
//! - **Traits**: [`Cache`] and [`Geocoder`], the seams repositories depend on
//!
//! ## Example
//!
//! ```rust
//! use agora_core::Location;
//!
//! let loc = Location::new(-1.0, 1.0, "some location");
//! let json = serde_json::to_string(&loc).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{AgoraError, Result};
pub use traits::*;
pub use types::*;

//! # Home Free - Accessibility Proximity Library
//!
//! Answers simple proximity questions about accessibility by combining
//! OpenStreetMap data (via the Overpass API) with City of Melbourne open
//! data:
//!
//! - How many accessibility features (toilets, wheelchair access, ramps)
//!   are near a coordinate?
//! - What is the accessibility rating of the nearest building?
//!
//! ## Features
//!
//! - **Pure resolver**: nearest-building lookup with the haversine formula,
//!   no I/O, safe to call from any number of concurrent requests
//! - **Tolerant parsing**: upstream coordinates may be numbers or strings;
//!   malformed records are skipped, never fatal
//! - **Async client**: `client` feature adds a `reqwest` client for the
//!   upstream APIs
//!
//! ## Quick Start
//!
//! ```
//! use homefree::{resolve_nearest, Coordinate, Record, Resolution};
//! use serde_json::json;
//!
//! let opera_house = Coordinate::new(-33.8688, 151.2093)?;
//! let buildings: Vec<Record> = serde_json::from_value(json!([
//!     {"latitude": "-33.8688", "longitude": "151.2093", "accessibility_rating": 2},
//!     {"latitude": -34.0, "longitude": 151.0, "accessibility_rating": 3},
//! ]))?;
//!
//! assert_eq!(resolve_nearest(opera_house, &buildings, 200.0), Resolution::Found(2));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Data Sources
//!
//! - <https://overpass-api.de/>
//! - <https://data.melbourne.vic.gov.au/>

pub mod config;
pub mod error;
pub mod geo;
pub mod overpass;
pub mod resolver;
pub mod score;

#[cfg(feature = "client")]
pub mod client;

// Re-export main types at crate root for convenience
pub use config::{AllowedOrigin, ServiceConfig, ServiceConfigBuilder, UpstreamConfig};
pub use error::{HomeFreeError, Result};
pub use geo::{haversine_distance, Coordinate};
pub use overpass::{CountElement, CountTags};
pub use resolver::{nearest_within, resolve_nearest, ProximityResolver, Record, Resolution};

#[cfg(feature = "client")]
pub use client::UpstreamClient;

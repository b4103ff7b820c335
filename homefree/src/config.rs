//! Service configuration.
//!
//! [`ServiceConfig`] holds everything request handlers need: the allowed
//! cross-origin policy, upstream URLs and the radius/limit constants. It is
//! assembled with [`ServiceConfigBuilder`], either in code or from
//! environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOMEFREE_PORT` | HTTP server port | 8080 |
//! | `HOMEFREE_ALLOWED_ORIGIN` | `*` or a single origin | `*` |
//! | `HOMEFREE_OVERPASS_URL` | Overpass interpreter URL | public Overpass |
//! | `HOMEFREE_MOBILITY_URL` | Public toilets export URL | Melbourne open data |
//! | `HOMEFREE_BUILDINGS_URL` | Buildings records URL | Melbourne open data |
//! | `HOMEFREE_BUILDING_LIMIT` | Buildings fetched per lookup | 500 |
//! | `HOMEFREE_SEARCH_RADIUS` | Feature search radius (m) | 500 |
//! | `HOMEFREE_RESOLVE_RADIUS` | Building lookup radius (m) | 200 |
//! | `HOMEFREE_TIMEOUT_SECS` | Upstream request timeout | 30 |

use std::fmt;
use std::str::FromStr;

use crate::error::{HomeFreeError, Result};
use crate::overpass::{DEFAULT_OVERPASS_URL, DEFAULT_SEARCH_RADIUS_METERS};
use crate::resolver::DEFAULT_RADIUS_METERS;

/// City of Melbourne public toilets export.
pub const DEFAULT_MOBILITY_URL: &str =
    "https://data.melbourne.vic.gov.au/api/v2/catalog/datasets/public-toilets/exports/json";

/// City of Melbourne buildings dataset records.
pub const DEFAULT_BUILDINGS_URL: &str = "https://data.melbourne.vic.gov.au/api/explore/v2.1/catalog/datasets/buildings-with-name-age-size-accessibility-and-bicycle-facilities/records";

/// Default number of building records fetched per lookup.
pub const DEFAULT_BUILDING_LIMIT: u32 = 500;

/// Default upstream request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Cross-origin policy for browser clients.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedOrigin {
    /// Any origin (`*`).
    #[default]
    Any,
    /// A single named origin, e.g. `https://www.realestate.com.au`.
    Exact(String),
}

impl FromStr for AllowedOrigin {
    type Err = HomeFreeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed {
            "" => Err(HomeFreeError::Config(
                "allowed origin must not be empty".to_string(),
            )),
            "*" => Ok(AllowedOrigin::Any),
            origin if origin.starts_with("http://") || origin.starts_with("https://") => {
                Ok(AllowedOrigin::Exact(origin.trim_end_matches('/').to_string()))
            }
            other => Err(HomeFreeError::Config(format!(
                "allowed origin must be '*' or an http(s) origin, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AllowedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedOrigin::Any => f.write_str("*"),
            AllowedOrigin::Exact(origin) => f.write_str(origin),
        }
    }
}

/// Upstream endpoints and request settings.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// Overpass interpreter URL.
    pub overpass_url: String,
    /// Public toilets export URL.
    pub mobility_url: String,
    /// Buildings dataset records URL, without the `limit` parameter.
    pub buildings_url: String,
    /// Maximum number of building records to fetch.
    pub building_limit: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            mobility_url: DEFAULT_MOBILITY_URL.to_string(),
            buildings_url: DEFAULT_BUILDINGS_URL.to_string(),
            building_limit: DEFAULT_BUILDING_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// HTTP server port.
    pub port: u16,
    /// Cross-origin policy.
    pub allowed_origin: AllowedOrigin,
    /// Upstream settings.
    pub upstream: UpstreamConfig,
    /// Radius for accessibility feature counts, in meters.
    pub search_radius_meters: u32,
    /// Radius for nearest-building lookups, in meters.
    pub resolve_radius_meters: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfigBuilder::new().build()
    }
}

impl ServiceConfig {
    /// Create a builder with default settings.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }
}

/// Builder for [`ServiceConfig`].
///
/// # Example
///
/// ```
/// use homefree::config::{AllowedOrigin, ServiceConfigBuilder};
///
/// let config = ServiceConfigBuilder::new()
///     .port(3000)
///     .allowed_origin(AllowedOrigin::Exact("https://www.realestate.com.au".into()))
///     .resolve_radius(150.0)
///     .build();
///
/// assert_eq!(config.port, 3000);
/// assert_eq!(config.upstream.building_limit, 500);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceConfigBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServiceConfig {
                port: DEFAULT_PORT,
                allowed_origin: AllowedOrigin::Any,
                upstream: UpstreamConfig::default(),
                search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
                resolve_radius_meters: DEFAULT_RADIUS_METERS,
            },
        }
    }

    /// Create a builder from `HOMEFREE_*` environment variables.
    ///
    /// Unset variables keep their defaults. Unparsable numbers are
    /// reported through `warnings` and also keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOMEFREE_ALLOWED_ORIGIN` is set to an invalid origin.
    pub fn from_env() -> Result<(Self, Vec<String>)> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a builder from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the allowed origin is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<(Self, Vec<String>)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::new();
        let mut warnings = Vec::new();

        if let Some(origin) = lookup("HOMEFREE_ALLOWED_ORIGIN") {
            builder = builder.allowed_origin(origin.parse()?);
        }
        if let Some(url) = lookup("HOMEFREE_OVERPASS_URL") {
            builder = builder.overpass_url(url);
        }
        if let Some(url) = lookup("HOMEFREE_MOBILITY_URL") {
            builder = builder.mobility_url(url);
        }
        if let Some(url) = lookup("HOMEFREE_BUILDINGS_URL") {
            builder = builder.buildings_url(url);
        }

        if let Some(port) = parse_var(&lookup, "HOMEFREE_PORT", &mut warnings) {
            builder = builder.port(port);
        }
        if let Some(limit) = parse_var(&lookup, "HOMEFREE_BUILDING_LIMIT", &mut warnings) {
            builder = builder.building_limit(limit);
        }
        if let Some(radius) = parse_var(&lookup, "HOMEFREE_SEARCH_RADIUS", &mut warnings) {
            builder = builder.search_radius(radius);
        }
        if let Some(radius) = parse_var::<f64, _>(&lookup, "HOMEFREE_RESOLVE_RADIUS", &mut warnings)
        {
            if radius.is_finite() && radius > 0.0 {
                builder = builder.resolve_radius(radius);
            } else {
                warnings.push(format!(
                    "HOMEFREE_RESOLVE_RADIUS must be positive, got {}; using default",
                    radius
                ));
            }
        }
        if let Some(secs) = parse_var(&lookup, "HOMEFREE_TIMEOUT_SECS", &mut warnings) {
            builder = builder.timeout_secs(secs);
        }

        Ok((builder, warnings))
    }

    /// Set the HTTP port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the cross-origin policy.
    pub fn allowed_origin(mut self, origin: AllowedOrigin) -> Self {
        self.config.allowed_origin = origin;
        self
    }

    /// Set the Overpass interpreter URL.
    pub fn overpass_url(mut self, url: impl Into<String>) -> Self {
        self.config.upstream.overpass_url = url.into();
        self
    }

    /// Set the public toilets export URL.
    pub fn mobility_url(mut self, url: impl Into<String>) -> Self {
        self.config.upstream.mobility_url = url.into();
        self
    }

    /// Set the buildings records URL.
    pub fn buildings_url(mut self, url: impl Into<String>) -> Self {
        self.config.upstream.buildings_url = url.into();
        self
    }

    /// Set the number of building records fetched per lookup.
    pub fn building_limit(mut self, limit: u32) -> Self {
        self.config.upstream.building_limit = limit;
        self
    }

    /// Set the upstream request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.upstream.timeout_secs = secs;
        self
    }

    /// Set the radius for accessibility feature counts.
    pub fn search_radius(mut self, meters: u32) -> Self {
        self.config.search_radius_meters = meters;
        self
    }

    /// Set the radius for nearest-building lookups.
    pub fn resolve_radius(mut self, meters: f64) -> Self {
        self.config.resolve_radius_meters = meters;
        self
    }

    /// Build the [`ServiceConfig`].
    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, warnings: &mut Vec<String>) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warnings.push(format!("Could not parse {}='{}'; using default", key, raw));
            None
        }
    }
}

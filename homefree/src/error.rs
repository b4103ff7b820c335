//! Error types for the Home Free library.

use thiserror::Error;

/// Errors that can occur when resolving accessibility data.
#[derive(Error, Debug)]
pub enum HomeFreeError {
    /// An upstream data source failed or returned a non-success status.
    #[error("Upstream request to {url} failed: {reason}")]
    Upstream { url: String, reason: String },

    /// Coordinates are outside the valid WGS84 range.
    #[error("Coordinates out of bounds: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    OutOfBounds { lat: f64, lon: f64 },

    /// A query parameter was missing or not numeric.
    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    /// The service could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HomeFreeError {
    /// Build an [`HomeFreeError::Upstream`] from a URL and any displayable reason.
    pub fn upstream(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        HomeFreeError::Upstream {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias using [`HomeFreeError`].
pub type Result<T> = std::result::Result<T, HomeFreeError>;

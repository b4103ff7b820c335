//! Coordinates and great-circle distance.
//!
//! All distances are computed on a sphere of mean Earth radius using the
//! haversine formula, in double precision throughout.

use serde::{Deserialize, Serialize};

use crate::error::{HomeFreeError, Result};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub lon: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFreeError::OutOfBounds`] if either component is not
    /// finite or lies outside its valid range.
    ///
    /// # Examples
    ///
    /// ```
    /// use homefree::Coordinate;
    ///
    /// assert!(Coordinate::new(-33.8688, 151.2093).is_ok());
    /// assert!(Coordinate::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(HomeFreeError::OutOfBounds { lat, lon });
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(HomeFreeError::OutOfBounds { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Create a coordinate without range checks.
    ///
    /// Used for upstream record positions, which are only ever compared
    /// against a validated reference point.
    pub const fn unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(*self, *other)
    }
}

/// Haversine great-circle distance between two coordinates, in meters.
///
/// # Examples
///
/// ```
/// use homefree::{geo::haversine_distance, Coordinate};
///
/// let opera_house = Coordinate::unchecked(-33.8568, 151.2153);
/// assert_eq!(haversine_distance(opera_house, opera_house), 0.0);
///
/// // One degree of latitude is roughly 111 km
/// let a = Coordinate::unchecked(0.0, 0.0);
/// let b = Coordinate::unchecked(1.0, 0.0);
/// let d = haversine_distance(a, b);
/// assert!((d - 111_195.0).abs() < 1.0);
/// ```
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (-33.8688, 151.2093), (89.9, -179.9), (-37.8136, 144.9631)] {
            let c = Coordinate::unchecked(lat, lon);
            assert_eq!(haversine_distance(c, c), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let sydney = Coordinate::unchecked(-33.8688, 151.2093);
        let melbourne = Coordinate::unchecked(-37.8136, 144.9631);
        let ab = sydney.distance_to(&melbourne);
        let ba = melbourne.distance_to(&sydney);
        assert!((ab - ba).abs() < 1e-6);
        // Sydney to Melbourne is about 714 km
        assert!((ab - 714_000.0).abs() < 5_000.0);
    }

    #[test]
    fn test_antipodal_distance() {
        let a = Coordinate::unchecked(0.0, 0.0);
        let b = Coordinate::unchecked(0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((haversine_distance(a, b) - half_circumference).abs() < 1e-3);
    }
}

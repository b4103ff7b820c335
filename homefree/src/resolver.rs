//! Nearest-building lookup within a fixed radius.
//!
//! The resolver performs a plain linear scan over the candidate records in
//! input order. Upstream datasets are fetched with a fixed record limit (500
//! buildings by default) and number in the low thousands overall, so no
//! spatial index is built; every call is `O(n)` in the number of candidates.
//!
//! The radius is also the initial "best distance so far": a record replaces
//! the current best when its distance is `<=` the best, so the first record
//! inside the radius always matches and exact ties go to the later record.

use serde_json::{Map, Value};

use crate::geo::{haversine_distance, Coordinate};

/// Default search radius for building lookups, in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 200.0;

/// Attribute holding a record's latitude.
pub const LATITUDE_FIELD: &str = "latitude";
/// Attribute holding a record's longitude.
pub const LONGITUDE_FIELD: &str = "longitude";
/// Attribute holding a building's accessibility rating (0-3).
pub const RATING_FIELD: &str = "accessibility_rating";

/// One upstream dataset row, as an opaque attribute map.
pub type Record = Map<String, Value>;

/// Outcome of a nearest-building lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The nearest building within the radius carries this rating.
    Found(i64),
    /// No building within the radius, or the nearest one has no rating.
    NotFound,
}

impl Resolution {
    /// The rating, if one was found.
    pub fn rating(self) -> Option<i64> {
        match self {
            Resolution::Found(rating) => Some(rating),
            Resolution::NotFound => None,
        }
    }
}

/// The best-matching record of a scan and its distance from the reference.
#[derive(Debug, Clone, Copy)]
pub struct Nearest<'a> {
    /// The matched record.
    pub record: &'a Record,
    /// Distance from the reference point in meters.
    pub distance_meters: f64,
}

impl Nearest<'_> {
    /// The record's accessibility rating, if present and integral.
    pub fn rating(&self) -> Option<i64> {
        self.record.get(RATING_FIELD).and_then(parse_rating)
    }
}

/// Stateless resolver configured with a radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityResolver {
    radius_meters: f64,
}

impl Default for ProximityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_METERS)
    }
}

impl ProximityResolver {
    /// Create a resolver that only considers records within `radius_meters`.
    pub const fn new(radius_meters: f64) -> Self {
        Self { radius_meters }
    }

    /// The configured radius in meters.
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Resolve the rating of the nearest record to `reference`.
    pub fn resolve(&self, reference: Coordinate, candidates: &[Record]) -> Resolution {
        resolve_nearest(reference, candidates, self.radius_meters)
    }
}

/// Resolve the accessibility rating of the record nearest to `reference`.
///
/// Records with missing or non-numeric coordinates are skipped. A match
/// without a usable rating yields [`Resolution::NotFound`].
pub fn resolve_nearest(
    reference: Coordinate,
    candidates: &[Record],
    max_radius_meters: f64,
) -> Resolution {
    nearest_within(reference, candidates, max_radius_meters)
        .and_then(|nearest| nearest.rating())
        .map_or(Resolution::NotFound, Resolution::Found)
}

/// Find the record nearest to `reference` within `max_radius_meters`.
pub fn nearest_within(
    reference: Coordinate,
    candidates: &[Record],
    max_radius_meters: f64,
) -> Option<Nearest<'_>> {
    let mut best: Option<Nearest<'_>> = None;
    let mut best_distance = max_radius_meters;

    for record in candidates {
        let Some(position) = record_position(record) else {
            continue;
        };

        let distance = haversine_distance(reference, position);
        if distance <= best_distance {
            best_distance = distance;
            best = Some(Nearest {
                record,
                distance_meters: distance,
            });
        }
    }

    best
}

/// Extract a record's position from its latitude/longitude attributes.
///
/// Both numbers and numeric strings are accepted.
pub fn record_position(record: &Record) -> Option<Coordinate> {
    let lat = record.get(LATITUDE_FIELD).and_then(parse_number)?;
    let lon = record.get(LONGITUDE_FIELD).and_then(parse_number)?;
    Some(Coordinate::unchecked(lat, lon))
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_rating(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| truncate(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| truncate(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

fn truncate(n: f64) -> Option<i64> {
    n.is_finite().then(|| n.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn opera_house() -> Coordinate {
        Coordinate::new(-33.8688, 151.2093).unwrap()
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(
            resolve_nearest(opera_house(), &[], DEFAULT_RADIUS_METERS),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_exact_match_wins_over_distant() {
        let candidates = vec![
            record(json!({"latitude": -33.8688, "longitude": 151.2093, "accessibility_rating": 2})),
            record(json!({"latitude": -34.0, "longitude": 151.0, "accessibility_rating": 3})),
        ];
        assert_eq!(
            resolve_nearest(opera_house(), &candidates, 200.0),
            Resolution::Found(2)
        );
    }

    #[test]
    fn test_all_outside_radius() {
        let candidates = vec![record(
            json!({"latitude": -34.0, "longitude": 151.0, "accessibility_rating": 3}),
        )];
        assert_eq!(
            resolve_nearest(opera_house(), &candidates, 200.0),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_non_numeric_coordinates_are_skipped() {
        let candidates = vec![
            record(json!({"latitude": "not-a-number", "longitude": 151.2093, "accessibility_rating": 1})),
            record(json!({"longitude": 151.2093, "accessibility_rating": 1})),
            record(json!({"latitude": null, "longitude": 151.2093, "accessibility_rating": 1})),
        ];
        assert_eq!(
            resolve_nearest(opera_house(), &candidates, 200.0),
            Resolution::NotFound
        );

        // A malformed record does not abort the scan
        let mut candidates = candidates;
        candidates.push(record(
            json!({"latitude": "-33.8689", "longitude": "151.2093", "accessibility_rating": "3"}),
        ));
        assert_eq!(
            resolve_nearest(opera_house(), &candidates, 200.0),
            Resolution::Found(3)
        );
    }

    #[test]
    fn test_match_without_rating_is_not_found() {
        let candidates = vec![record(json!({"latitude": -33.8688, "longitude": 151.2093}))];
        assert_eq!(
            resolve_nearest(opera_house(), &candidates, 200.0),
            Resolution::NotFound
        );
        // The geometric match itself is still found
        assert!(nearest_within(opera_house(), &candidates, 200.0).is_some());
    }

    #[test]
    fn test_nearest_rating_missing_hides_farther_rated_building() {
        let candidates = vec![
            record(json!({"latitude": -33.8690, "longitude": 151.2093, "accessibility_rating": 1})),
            record(json!({"latitude": -33.8688, "longitude": 151.2093})),
        ];
        assert_eq!(
            resolve_nearest(opera_house(), &candidates, 200.0),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_closest_within_radius_wins() {
        let candidates = vec![
            record(json!({"latitude": -33.8700, "longitude": 151.2093, "accessibility_rating": 0})),
            record(json!({"latitude": -33.8689, "longitude": 151.2093, "accessibility_rating": 1})),
            record(json!({"latitude": -33.8695, "longitude": 151.2093, "accessibility_rating": 2})),
        ];
        let nearest = nearest_within(opera_house(), &candidates, 200.0).unwrap();
        assert_eq!(nearest.rating(), Some(1));
        assert!(nearest.distance_meters < 20.0);
    }

    #[test]
    fn test_ties_go_to_later_record() {
        let candidates = vec![
            record(json!({"latitude": -33.8690, "longitude": 151.2093, "accessibility_rating": 1})),
            record(json!({"latitude": -33.8690, "longitude": 151.2093, "accessibility_rating": 3})),
        ];
        assert_eq!(
            resolve_nearest(opera_house(), &candidates, 200.0),
            Resolution::Found(3)
        );
    }

    #[test]
    fn test_never_exceeds_radius() {
        let reference = opera_house();
        let candidates: Vec<Record> = (0..50)
            .map(|i| {
                let offset = f64::from(i) * 0.0005;
                record(json!({
                    "latitude": -33.8688 + offset,
                    "longitude": 151.2093 - offset,
                    "accessibility_rating": i % 4,
                }))
            })
            .collect();

        for radius in [10.0, 50.0, 150.0, 200.0, 1_000.0] {
            if let Some(nearest) = nearest_within(reference, &candidates, radius) {
                assert!(nearest.distance_meters <= radius);
                let position = record_position(nearest.record).unwrap();
                assert!(haversine_distance(reference, position) <= radius);
            }
        }
    }

    #[test]
    fn test_rating_formats() {
        let at = |rating: Value| {
            let candidates = vec![record(
                json!({"latitude": -33.8688, "longitude": 151.2093, "accessibility_rating": rating}),
            )];
            resolve_nearest(opera_house(), &candidates, 200.0)
        };
        assert_eq!(at(json!(0)), Resolution::Found(0));
        assert_eq!(at(json!("2")), Resolution::Found(2));
        assert_eq!(at(json!(2.0)), Resolution::Found(2));
        assert_eq!(at(json!(" 3 ")), Resolution::Found(3));
        assert_eq!(at(json!(null)), Resolution::NotFound);
        assert_eq!(at(json!("unknown")), Resolution::NotFound);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let candidates = vec![record(
            json!({"latitude": "-33.8688", "longitude": 151.2093, "accessibility_rating": 2}),
        )];
        let before = candidates.clone();
        let _ = ProximityResolver::default().resolve(opera_house(), &candidates);
        assert_eq!(candidates, before);
    }

    #[test]
    fn test_resolver_radius() {
        let resolver = ProximityResolver::new(50.0);
        assert_eq!(resolver.radius_meters(), 50.0);
        assert_eq!(ProximityResolver::default().radius_meters(), DEFAULT_RADIUS_METERS);

        // ~111m north is outside 50m but inside the default radius
        let candidates = vec![record(
            json!({"latitude": -33.8678, "longitude": 151.2093, "accessibility_rating": 1}),
        )];
        assert_eq!(resolver.resolve(opera_house(), &candidates), Resolution::NotFound);
        assert_eq!(
            ProximityResolver::default().resolve(opera_house(), &candidates),
            Resolution::Found(1)
        );
        assert_eq!(Resolution::Found(1).rating(), Some(1));
        assert_eq!(Resolution::NotFound.rating(), None);
    }
}

//! Neighbourhood and property accessibility scores.
//!
//! Scores are on a 0-10 scale, except the raw property score which adds
//! 10 points for single-level living and 2 points per extra feature.

use serde::Serialize;
use serde_json::Value;

use crate::resolver::Record;

/// Feature count that maps to a full feature score.
pub const FEATURES_FOR_FULL_SCORE: f64 = 200.0;

/// Accessible-toilet count that maps to a full mobility score.
pub const TOILETS_FOR_FULL_SCORE: f64 = 100.0;

/// Highest neighbourhood sub-score.
pub const MAX_SCORE: u32 = 10;

const SINGLE_LEVEL_PHRASES: [&str; 4] = [
    "single-level",
    "single storey",
    "single level",
    "single story",
];

const EXTRA_FEATURES: [(&str, &str); 5] = [
    ("Step-free entry", "step-free entry"),
    ("Wide doorways", "wide doorways"),
    ("Accessible bathroom", "accessible bathroom"),
    ("Roll-in shower", "roll-in shower"),
    ("Elevator", "elevator"),
];

/// Score from the number of accessibility features near a point.
pub fn feature_score(features_found: u64) -> u32 {
    scaled(features_found as f64, FEATURES_FOR_FULL_SCORE)
}

/// Score from the number of wheelchair-accessible public toilets.
pub fn mobility_score(accessible_toilets: u64) -> u32 {
    scaled(accessible_toilets as f64, TOILETS_FOR_FULL_SCORE)
}

/// Combined neighbourhood score: the rounded mean of both sub-scores.
pub fn hood_score(feature: u32, mobility: u32) -> u32 {
    rounded_mean(feature, mobility)
}

/// Overall listing score: the rounded mean of property and neighbourhood scores.
pub fn total_score(property: u32, hood: u32) -> u32 {
    rounded_mean(property, hood)
}

fn scaled(count: f64, full: f64) -> u32 {
    let score = (count / full * f64::from(MAX_SCORE)).round();
    (score as u32).min(MAX_SCORE)
}

fn rounded_mean(a: u32, b: u32) -> u32 {
    ((f64::from(a) + f64::from(b)) / 2.0).round() as u32
}

/// Count toilets flagged as wheelchair accessible.
///
/// Reads the `accessible` attribute, falling back to `wheelchair`.
pub fn count_accessible_toilets(records: &[Record]) -> u64 {
    records.iter().filter(|r| is_accessible_toilet(r)).count() as u64
}

fn is_accessible_toilet(record: &Record) -> bool {
    record
        .get("accessible")
        .or_else(|| record.get("wheelchair"))
        .and_then(Value::as_str)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("yes"))
}

/// Accessibility score extracted from a property listing description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyScore {
    /// Raw score.
    pub score: u32,
    /// Labels of the features mentioned in the listing.
    pub features: Vec<String>,
}

/// Score a property listing by the accessibility features it mentions.
///
/// # Examples
///
/// ```
/// use homefree::score::property_score;
///
/// let scored = property_score("Single level home with wide doorways");
/// assert_eq!(scored.score, 12);
/// assert_eq!(scored.features, vec!["Single-storey", "Wide doorways"]);
/// ```
pub fn property_score(text: &str) -> PropertyScore {
    let text = text.to_lowercase();
    let mut score = 0;
    let mut features = Vec::new();

    if SINGLE_LEVEL_PHRASES.iter().any(|p| text.contains(p)) {
        score += 10;
        features.push("Single-storey".to_string());
    }

    for (label, phrase) in EXTRA_FEATURES {
        if text.contains(phrase) {
            score += 2;
            features.push(label.to_string());
        }
    }

    PropertyScore { score, features }
}

/// Extract toilet records from a mobility export.
///
/// The export is a JSON array of rows; anything else has no rows.
pub fn mobility_records(export: &Value) -> Vec<Record> {
    export
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}

//! Overpass API query building and count-response shaping.
//!
//! The accessibility lookup asks Overpass for a count of nodes around a point
//! matching any of three tag predicates:
//!
//! - `amenity=toilets`
//! - `wheelchair=yes`
//! - `ramp=yes`
//!
//! Overpass answers `out count;` with a single element of type `count`
//! whose tags carry string-encoded totals.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geo::Coordinate;

/// Public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Default search radius for accessibility features, in meters.
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 500;

/// Tag predicates counted by the accessibility query.
pub const ACCESSIBILITY_TAGS: [(&str, &str); 3] = [
    ("amenity", "toilets"),
    ("wheelchair", "yes"),
    ("ramp", "yes"),
];

/// Tag counts of an Overpass `count` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountTags {
    /// Matching nodes.
    pub nodes: String,
    /// Matching ways.
    pub ways: String,
    /// Matching relations.
    pub relations: String,
    /// Total matches.
    pub total: String,
}

/// One element of an Overpass `out count;` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountElement {
    /// Element type, `"count"` for count responses.
    #[serde(rename = "type")]
    pub kind: String,
    /// Element id, always 0 for count responses.
    pub id: i64,
    /// Per-kind match counts.
    pub tags: CountTags,
}

impl CountElement {
    /// Total number of matches, or 0 if the tag is not numeric.
    pub fn total(&self) -> u64 {
        self.tags.total.trim().parse().unwrap_or(0)
    }
}

/// Build the Overpass QL query counting accessibility features around `center`.
///
/// # Examples
///
/// ```
/// use homefree::{overpass::accessibility_query, Coordinate};
///
/// let query = accessibility_query(Coordinate::unchecked(-33.8688, 151.2093), 500);
/// assert!(query.contains(r#"node["ramp"="yes"](around:500,-33.8688,151.2093);"#));
/// assert!(query.trim_end().ends_with("out count;"));
/// ```
pub fn accessibility_query(center: Coordinate, radius_meters: u32) -> String {
    let mut query = String::from("[out:json];\n(\n");
    for (key, value) in ACCESSIBILITY_TAGS {
        query.push_str(&format!(
            "  node[\"{}\"=\"{}\"](around:{},{},{});\n",
            key, value, radius_meters, center.lat, center.lon
        ));
    }
    query.push_str(");\nout count;\n");
    query
}

/// Reshape an Overpass JSON response into fixed count envelopes.
///
/// Missing `elements` yields an empty list. Non-object elements are skipped.
pub fn parse_count_response(response: &Value) -> Vec<CountElement> {
    response
        .get("elements")
        .and_then(Value::as_array)
        .map(|elements| elements.iter().filter_map(count_element).collect())
        .unwrap_or_default()
}

fn count_element(element: &Value) -> Option<CountElement> {
    let object = element.as_object()?;
    let tags = object.get("tags");

    Some(CountElement {
        kind: object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("count")
            .to_string(),
        id: object.get("id").and_then(Value::as_i64).unwrap_or(0),
        tags: CountTags {
            nodes: tag_value(tags, "nodes"),
            ways: tag_value(tags, "ways"),
            relations: tag_value(tags, "relations"),
            total: tag_value(tags, "total"),
        },
    })
}

fn tag_value(tags: Option<&Value>, key: &str) -> String {
    match tags.and_then(|t| t.get(key)) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    }
}

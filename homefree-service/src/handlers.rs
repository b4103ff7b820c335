//! HTTP request handlers for the accessibility service.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use homefree::{
    score::{self, PropertyScore},
    Coordinate, CountElement, HomeFreeError, ProximityResolver,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Liveness message returned by `GET /`.
pub const LIVENESS_MESSAGE: &str = "Home Free API is working";

/// Query parameters for coordinate-based endpoints.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CoordinateQuery {
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub lon: f64,
}

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Status message.
    pub message: String,
}

/// Accessibility feature counts near a coordinate.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessibilityResponse {
    /// Overpass count elements: `{type, id, tags: {nodes, ways, relations, total}}`.
    #[schema(value_type = Vec<Object>)]
    pub accessible_features_found: Vec<CountElement>,
}

/// Raw public toilets dataset.
#[derive(Debug, Serialize, ToSchema)]
pub struct MobilityResponse {
    /// The dataset export as returned by the open-data catalog.
    #[schema(value_type = Object)]
    pub mobility_data: serde_json::Value,
}

/// Accessibility rating of the nearest building.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuildingResponse {
    /// Rating 0-3, or null when no rated building is within range.
    pub accessibility_rating: Option<i64>,
}

/// Neighbourhood accessibility score.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreResponse {
    /// Accessibility features within the search radius.
    pub features_found: u64,
    /// Wheelchair-accessible public toilets in the dataset.
    pub accessible_toilets: u64,
    /// Feature score (0-10).
    pub feature_score: u32,
    /// Mobility score (0-10).
    pub mobility_score: u32,
    /// Combined neighbourhood score (0-10).
    pub hood_score: u32,
}

/// Property listing text to score.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PropertyRequest {
    /// Listing description.
    pub text: String,
}

/// Property accessibility score.
#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyResponse {
    /// Raw property score.
    pub score: u32,
    /// Accessibility features mentioned in the listing.
    pub features: Vec<String>,
}

impl From<PropertyScore> for PropertyResponse {
    fn from(scored: PropertyScore) -> Self {
        Self {
            score: scored.score,
            features: scored.features,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Underlying cause, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses((status = 200, description = "Service is running", body = MessageResponse))
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: LIVENESS_MESSAGE.to_string(),
    })
}

/// Count accessibility features near a coordinate.
///
/// Counts toilets, wheelchair-accessible places and ramps within the
/// configured search radius (500m by default) using the Overpass API.
///
/// # Returns
///
/// - `200 OK` with the count envelope
/// - `400 Bad Request` if `lat`/`lon` are missing, non-numeric or out of range
/// - `502 Bad Gateway` if Overpass is unavailable
#[utoipa::path(
    get,
    path = "/accessibility",
    tag = "accessibility",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Feature counts", body = AccessibilityResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 502, description = "Overpass unavailable", body = ErrorResponse)
    )
)]
pub async fn get_accessibility(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Response {
    let center = match parse_coordinate(query) {
        Ok(center) => center,
        Err(response) => return response,
    };

    tracing::debug!(lat = center.lat, lon = center.lon, "Accessibility query");

    match state
        .upstream
        .count_accessibility_features(center, state.config.search_radius_meters)
        .await
    {
        Ok(elements) => {
            tracing::info!(
                lat = center.lat,
                lon = center.lon,
                total = elements.first().map(CountElement::total).unwrap_or(0),
                "Accessibility features counted"
            );
            (
                StatusCode::OK,
                Json(AccessibilityResponse {
                    accessible_features_found: elements,
                }),
            )
                .into_response()
        }
        Err(e) => error_response("Failed to fetch accessibility data", e),
    }
}

/// Fetch the public toilets dataset.
///
/// Upstream failures are reported in the body with status 200, as
/// `{"error": ..., "details": ...}`.
#[utoipa::path(
    get,
    path = "/mobility",
    tag = "accessibility",
    responses(
        (status = 200, description = "Toilet dataset, or an error body if the catalog is unavailable", body = MobilityResponse)
    )
)]
pub async fn get_mobility(State(state): State<Arc<AppState>>) -> Response {
    match state.upstream.fetch_mobility().await {
        Ok(data) => {
            tracing::info!("Mobility data fetched");
            Json(MobilityResponse {
                mobility_data: data,
            })
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Mobility data unavailable");
            (
                StatusCode::OK,
                Json(ErrorResponse {
                    error: "Failed to fetch mobility data".to_string(),
                    details: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Accessibility rating of the nearest building.
///
/// Fetches the first building records of the dataset and returns the rating
/// of the closest one within the configured radius (200m by default).
///
/// # Returns
///
/// - `200 OK` with the rating, or `null` if none is in range
/// - `400 Bad Request` if `lat`/`lon` are missing, non-numeric or out of range
/// - `502 Bad Gateway` if the buildings dataset is unavailable
#[utoipa::path(
    get,
    path = "/buildings",
    tag = "accessibility",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Nearest building rating", body = BuildingResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 502, description = "Buildings dataset unavailable", body = ErrorResponse)
    )
)]
pub async fn get_buildings(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Response {
    let reference = match parse_coordinate(query) {
        Ok(reference) => reference,
        Err(response) => return response,
    };

    let buildings = match state.upstream.fetch_buildings().await {
        Ok(buildings) => buildings,
        Err(e) => return error_response("Failed to fetch building data", e),
    };

    let resolver = ProximityResolver::new(state.config.resolve_radius_meters);
    let rating = resolver.resolve(reference, &buildings).rating();

    tracing::info!(
        lat = reference.lat,
        lon = reference.lon,
        candidates = buildings.len(),
        rating = ?rating,
        "Building lookup resolved"
    );

    Json(BuildingResponse {
        accessibility_rating: rating,
    })
    .into_response()
}

/// Neighbourhood accessibility score for a coordinate.
///
/// Combines the nearby feature count with the number of wheelchair-accessible
/// public toilets. Both upstream calls are issued concurrently.
#[utoipa::path(
    get,
    path = "/score",
    tag = "score",
    params(CoordinateQuery),
    responses(
        (status = 200, description = "Neighbourhood score", body = ScoreResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 502, description = "Upstream unavailable", body = ErrorResponse)
    )
)]
pub async fn get_score(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Response {
    let center = match parse_coordinate(query) {
        Ok(center) => center,
        Err(response) => return response,
    };

    let (features, mobility) = tokio::join!(
        state
            .upstream
            .count_accessibility_features(center, state.config.search_radius_meters),
        state.upstream.fetch_mobility()
    );

    let features_found = match features {
        Ok(elements) => elements.first().map(CountElement::total).unwrap_or(0),
        Err(e) => return error_response("Failed to fetch accessibility data", e),
    };
    let accessible_toilets = match mobility {
        Ok(export) => score::count_accessible_toilets(&score::mobility_records(&export)),
        Err(e) => return error_response("Failed to fetch mobility data", e),
    };

    let feature_score = score::feature_score(features_found);
    let mobility_score = score::mobility_score(accessible_toilets);

    Json(ScoreResponse {
        features_found,
        accessible_toilets,
        feature_score,
        mobility_score,
        hood_score: score::hood_score(feature_score, mobility_score),
    })
    .into_response()
}

/// Score a property listing description.
#[utoipa::path(
    post,
    path = "/property-score",
    tag = "score",
    request_body = PropertyRequest,
    responses((status = 200, description = "Property score", body = PropertyResponse))
)]
pub async fn post_property_score(Json(request): Json<PropertyRequest>) -> Json<PropertyResponse> {
    Json(score::property_score(&request.text).into())
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Validate query parameters into a coordinate, or build a 400 response.
#[allow(clippy::result_large_err)]
fn parse_coordinate(
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Result<Coordinate, Response> {
    let Query(query) = query.map_err(|rejection| {
        let e = HomeFreeError::InvalidQuery(rejection.body_text());
        error_response("lat and lon query parameters must be numbers", e)
    })?;

    Coordinate::new(query.lat, query.lon)
        .map_err(|e| error_response("Invalid coordinates", e))
}

/// Create an error response from a library error.
fn error_response(message: &str, e: HomeFreeError) -> Response {
    let status = match &e {
        HomeFreeError::OutOfBounds { .. } | HomeFreeError::InvalidQuery(_) => {
            StatusCode::BAD_REQUEST
        }
        HomeFreeError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        HomeFreeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(status = %status, error = %e, "{}", message);

    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
            details: Some(e.to_string()),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_query_deserialize() {
        let json = r#"{"lat": -33.8688, "lon": 151.2093}"#;
        let query: CoordinateQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.lat, -33.8688);
        assert_eq!(query.lon, 151.2093);
    }

    #[test]
    fn test_building_response_serialize() {
        let json = serde_json::to_string(&BuildingResponse {
            accessibility_rating: Some(2),
        })
        .unwrap();
        assert_eq!(json, r#"{"accessibility_rating":2}"#);

        let json = serde_json::to_string(&BuildingResponse {
            accessibility_rating: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"accessibility_rating":null}"#);
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "boom".to_string(),
            details: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_error_status_mapping() {
        let response = error_response("x", HomeFreeError::upstream("http://a", "HTTP 500"));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = error_response("x", HomeFreeError::OutOfBounds { lat: 91.0, lon: 0.0 });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

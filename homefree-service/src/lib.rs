//! Home Free Service Library
//!
//! HTTP handlers, router and shared state for the accessibility service.
//! This library is used by both the homefree-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use homefree::{AllowedOrigin, HomeFreeError, ServiceConfig, UpstreamClient};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers.
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,
    /// Client for the upstream open-data services.
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Build the state, creating the upstream HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ServiceConfig) -> homefree::Result<Self> {
        let upstream = UpstreamClient::new(config.upstream.clone())?;
        Ok(Self { config, upstream })
    }
}

/// OpenAPI documentation for the Home Free service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Home Free Accessibility API",
        version = "0.1.0",
        description = "Accessibility features, public toilets and building ratings near a coordinate.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::root,
        handlers::get_accessibility,
        handlers::get_mobility,
        handlers::get_buildings,
        handlers::get_score,
        handlers::post_property_score,
        handlers::health_check,
    ),
    components(
        schemas(
            handlers::CoordinateQuery,
            handlers::MessageResponse,
            handlers::AccessibilityResponse,
            handlers::MobilityResponse,
            handlers::BuildingResponse,
            handlers::ScoreResponse,
            handlers::PropertyRequest,
            handlers::PropertyResponse,
            handlers::ErrorResponse,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "accessibility", description = "Open-data proxy endpoints"),
        (name = "score", description = "Accessibility scoring endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the CORS layer for the configured origin policy.
///
/// A single named origin is only echoed back to requests from that origin.
///
/// # Errors
///
/// Returns [`HomeFreeError::Config`] if the origin is not a valid header value.
pub fn cors_layer(origin: &AllowedOrigin) -> homefree::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin {
        AllowedOrigin::Any => Ok(layer.allow_origin(Any)),
        AllowedOrigin::Exact(origin) => {
            let value = HeaderValue::from_str(origin).map_err(|e| {
                HomeFreeError::Config(format!("Invalid allowed origin '{}': {}", origin, e))
            })?;
            Ok(layer.allow_origin(AllowOrigin::list([value])))
        }
    }
}

/// Build the application router with docs, tracing and CORS.
///
/// # Errors
///
/// Returns an error if the configured CORS origin is invalid.
pub fn build_router(state: Arc<AppState>) -> homefree::Result<Router> {
    let cors = cors_layer(&state.config.allowed_origin)?;

    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::root))
        .route("/accessibility", get(handlers::get_accessibility))
        .route("/mobility", get(handlers::get_mobility))
        .route("/buildings", get(handlers::get_buildings))
        .route("/score", get(handlers::get_score))
        .route("/property-score", post(handlers::post_property_score))
        .route("/health", get(handlers::health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

// Re-export commonly used types for convenience
pub use handlers::{
    AccessibilityResponse, BuildingResponse, CoordinateQuery, ErrorResponse, HealthResponse,
    MessageResponse, MobilityResponse, ScoreResponse,
};

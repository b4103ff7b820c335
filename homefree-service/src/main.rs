//! Home Free Service - HTTP microservice for accessibility proximity queries.
//!
//! Aggregates the Overpass API and City of Melbourne open data behind a
//! small JSON API.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOMEFREE_PORT` | HTTP server port | 8080 |
//! | `HOMEFREE_ALLOWED_ORIGIN` | CORS origin: `*` or one origin | `*` |
//! | `HOMEFREE_OVERPASS_URL` | Overpass interpreter URL | public Overpass |
//! | `HOMEFREE_MOBILITY_URL` | Public toilets export URL | Melbourne open data |
//! | `HOMEFREE_BUILDINGS_URL` | Buildings records URL | Melbourne open data |
//! | `HOMEFREE_BUILDING_LIMIT` | Buildings fetched per lookup | 500 |
//! | `HOMEFREE_SEARCH_RADIUS` | Feature search radius (m) | 500 |
//! | `HOMEFREE_RESOLVE_RADIUS` | Building lookup radius (m) | 200 |
//! | `HOMEFREE_TIMEOUT_SECS` | Upstream request timeout | 30 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /` - Liveness message
//! - `GET /accessibility?lat=X&lon=Y` - Accessibility feature counts
//! - `GET /mobility` - Public toilets dataset
//! - `GET /buildings?lat=X&lon=Y` - Nearest building accessibility rating
//! - `GET /score?lat=X&lon=Y` - Neighbourhood score
//! - `POST /property-score` - Score a listing description
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use homefree::ServiceConfigBuilder;
use homefree_service::{build_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homefree_service=info,homefree=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (builder, warnings) = ServiceConfigBuilder::from_env()?;
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    let config = builder.build();
    let port = config.port;

    tracing::info!(
        port = port,
        allowed_origin = %config.allowed_origin,
        overpass_url = %config.upstream.overpass_url,
        buildings_url = %config.upstream.buildings_url,
        building_limit = config.upstream.building_limit,
        resolve_radius = config.resolve_radius_meters,
        "Starting Home Free service"
    );

    let state = Arc::new(AppState::new(config)?);
    let app = build_router(state)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

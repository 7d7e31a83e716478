//! REST API server module
//!
//! Exposes the search pipeline as a JSON endpoint with OpenAPI documentation.

use crate::{Result, SearchPipeline};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `POST /search` - Search repositories, scored and paginated
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(pipeline: SearchPipeline, shutdown: CancellationToken) -> Router {
    let api_config = pipeline.config().api.clone();
    let state = AppState::new(pipeline, shutdown);

    let router = Router::new()
        .route("/search", post(routes::search_repositories))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Swagger UI serves its own copy of the spec so it does not collide
    // with the /openapi.json route above
    let router = if api_config.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if api_config.cors_enabled {
        let cors = build_cors_layer(&api_config.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Serves until `shutdown` is cancelled, then drains in-flight requests.
/// Searches still running observe the same token, so they stop scheduling
/// retries and pages once shutdown begins.
///
/// # Example
///
/// ```no_run
/// use repo_scout::{Config, SearchPipeline};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = SearchPipeline::new(Config::default())?;
/// let shutdown = CancellationToken::new();
///
/// // Blocks until `shutdown` is cancelled
/// repo_scout::api::start_api_server(pipeline, shutdown).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(pipeline: SearchPipeline, shutdown: CancellationToken) -> Result<()> {
    let bind_address = pipeline.config().api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(pipeline, shutdown.clone());

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

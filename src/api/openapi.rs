//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the repo-scout REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the repo-scout REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "repo-scout REST API",
        version = "0.1.0",
        description = "Search GitHub repositories and rank them by a weighted popularity score",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::api::routes::search_repositories,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::SearchCriteria,
        crate::types::RepositoryRecord,
        crate::types::ResultPage,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "search", description = "Repository search ranked by popularity"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec"),
    )
)]
pub struct ApiDoc;

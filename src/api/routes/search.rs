//! Repository search endpoint

use crate::api::AppState;
use crate::error::{ApiError, Error, Result};
use crate::types::{ResultPage, SearchCriteria};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use std::sync::LazyLock;

/// Space-separated tokens of letters, digits, `+`, `#` and `-`
const LANGUAGE_PATTERN: &str = r"^[a-zA-Z0-9+#\-]+( [a-zA-Z0-9+#\-]+)*$";

static LANGUAGE_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(LANGUAGE_PATTERN));

/// POST /search - Search repositories and rank them by popularity
#[utoipa::path(
    post,
    path = "/search",
    tag = "search",
    request_body = SearchCriteria,
    responses(
        (status = 200, description = "Scored page of repositories", body = ResultPage),
        (status = 400, description = "Invalid request body or search criteria", body = crate::error::ApiError),
        (status = 422, description = "Upstream rejected the query", body = crate::error::ApiError),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ApiError),
        (status = 502, description = "Upstream unreachable or returned an unreadable body", body = crate::error::ApiError),
        (status = 503, description = "Upstream unavailable", body = crate::error::ApiError)
    )
)]
pub async fn search_repositories(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchCriteria>, JsonRejection>,
) -> Response {
    let criteria = match payload {
        Ok(Json(criteria)) => criteria,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected malformed search request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::invalid_request(rejection.body_text())),
            )
                .into_response();
        }
    };

    if let Err(e) = validate_criteria(&criteria) {
        return e.into_response();
    }

    match state
        .pipeline
        .search_with_cancel(&criteria, &state.shutdown)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Check caller input before it reaches the pipeline
///
/// Collects every violation rather than stopping at the first.
pub fn validate_criteria(criteria: &SearchCriteria) -> Result<()> {
    let mut details = Vec::new();

    if let Some(language) = criteria.language.as_deref() {
        let pattern = LANGUAGE_RE.as_ref().map_err(|e| Error::Config {
            message: format!("language pattern failed to compile: {e}"),
            key: None,
        })?;
        if !pattern.is_match(language) {
            details.push(
                "language: Language must be space-separated tokens of letters, digits, '+', '#' or '-'"
                    .to_string(),
            );
        }
    }

    if criteria.page_number == Some(0) {
        details.push("pageNumber: Page number must be at least 1".to_string());
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation {
            message: "invalid search criteria".into(),
            details,
        })
    }
}

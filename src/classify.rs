//! Upstream response classification
//!
//! Turns one HTTP response from the search API into a decoded page, the
//! "nothing to add" signal (`Ok(None)`), or a typed [`Error`].

use crate::error::{Error, Result};
use crate::types::{RepositoryRecord, ResultPage};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

/// Header carrying the remaining upstream request quota
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Remaining quota at or below which a warning is logged
const LOW_QUOTA_THRESHOLD: u64 = 10;

/// Search response body as sent by the upstream API
#[derive(Debug, Deserialize)]
struct UpstreamPage {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
    #[serde(default)]
    items: Option<Vec<UpstreamItem>>,
}

#[derive(Debug, Deserialize)]
struct UpstreamItem {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<UpstreamItem> for RepositoryRecord {
    fn from(item: UpstreamItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            language: item.language,
            star_count: item.stargazers_count,
            fork_count: item.forks_count,
            url: item.html_url,
            updated_at: item.updated_at,
            created_at: item.created_at,
            popularity_score: 0.0,
        }
    }
}

impl From<UpstreamPage> for ResultPage {
    fn from(page: UpstreamPage) -> Self {
        Self {
            total_count: page.total_count,
            incomplete_results: page.incomplete_results,
            has_next_page: false,
            page_number: None,
            next_page_number: None,
            items: page
                .items
                .unwrap_or_default()
                .into_iter()
                .map(RepositoryRecord::from)
                .collect(),
        }
    }
}

/// Classify a status and fully-read body
///
/// - 2xx: decode the body; a decode failure is [`Error::Decode`]
/// - 304: `Ok(None)`, nothing to add
/// - 422: [`Error::UpstreamClient`] prefixed "Validation failed"
/// - 503: [`Error::UpstreamServer`] prefixed "Service unavailable"
/// - other 5xx: [`Error::UpstreamServer`]; anything else: [`Error::UpstreamClient`]
pub fn classify(status: StatusCode, body: &[u8]) -> Result<Option<ResultPage>> {
    if status.is_success() {
        let page: UpstreamPage =
            serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))?;
        return Ok(Some(page.into()));
    }

    let text = String::from_utf8_lossy(body);

    match status {
        StatusCode::NOT_MODIFIED => {
            tracing::info!("GitHub API returned 304 Not Modified, nothing to add");
            Ok(None)
        }
        StatusCode::UNPROCESSABLE_ENTITY => {
            tracing::error!(body = %text, "GitHub API validation failed (422)");
            Err(Error::UpstreamClient {
                status: status.as_u16(),
                message: format!("Validation failed: {text}"),
            })
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            tracing::error!(body = %text, "GitHub API service unavailable (503)");
            Err(Error::UpstreamServer {
                status: status.as_u16(),
                message: format!("Service unavailable: {text}"),
            })
        }
        _ => {
            tracing::error!(status = status.as_u16(), body = %text, "GitHub API call failed");
            let message = format!("GitHub API responded with error: {text}");
            if status.is_server_error() {
                Err(Error::UpstreamServer {
                    status: status.as_u16(),
                    message,
                })
            } else {
                Err(Error::UpstreamClient {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// Read and classify a live upstream response
///
/// Bodies larger than `max_body_bytes` are rejected as [`Error::Decode`]
/// without buffering the remainder. A failure while reading the body is
/// [`Error::Transport`].
pub async fn classify_response(
    mut response: reqwest::Response,
    max_body_bytes: usize,
) -> Result<Option<ResultPage>> {
    log_remaining_quota(&response);

    let status = response.status();

    if let Some(len) = response.content_length() {
        if len > max_body_bytes as u64 {
            return Err(Error::Decode(format!(
                "response body of {len} bytes exceeds limit of {max_body_bytes} bytes"
            )));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > max_body_bytes {
            return Err(Error::Decode(format!(
                "response body exceeds limit of {max_body_bytes} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }

    classify(status, &body)
}

fn log_remaining_quota(response: &reqwest::Response) {
    let remaining = response
        .headers()
        .get(RATE_LIMIT_REMAINING_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match remaining {
        Some(n) if n <= LOW_QUOTA_THRESHOLD => {
            tracing::warn!(remaining = n, "GitHub API quota nearly exhausted")
        }
        Some(n) => tracing::debug!(remaining = n, "GitHub API quota"),
        None => {}
    }
}

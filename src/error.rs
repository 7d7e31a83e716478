//! Error types for repo-scout
//!
//! This module provides the closed failure taxonomy for the search pipeline:
//! - Upstream failures (rate limited, client error, server error, transport, decode)
//! - Caller-input validation and configuration errors
//! - HTTP status code mapping for the API front end
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for repo-scout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for repo-scout
///
/// Every failure the pipeline can surface is one of these variants. The API
/// front end matches on them exhaustively through [`ToHttpStatus`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "github.default_per_page")
        key: Option<String>,
    },

    /// Caller input rejected before reaching the pipeline
    #[error("validation failed: {message}")]
    Validation {
        /// Summary of the rejection
        message: String,
        /// Field-level messages, e.g. "pageNumber: Page number must be at least 1"
        details: Vec<String>,
    },

    /// The admission gate rejected the call
    #[error("rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Upstream answered with a non-retryable client-side status (4xx, 422, ...)
    #[error("{message}")]
    UpstreamClient {
        /// HTTP status returned by the upstream API
        status: u16,
        /// Diagnostic text including the upstream body
        message: String,
    },

    /// Upstream answered with a server-side status (5xx); eligible for retry
    #[error("{message}")]
    UpstreamServer {
        /// HTTP status returned by the upstream API
        status: u16,
        /// Diagnostic text including the upstream body
        message: String,
    },

    /// The HTTP call itself failed (connect, timeout, body read)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body could not be decoded into a result page
    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    /// The operation was cancelled before it could complete
    #[error("search cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "rate_limited",
///     "message": "rate limit exceeded. Please try again later."
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "rate_limited", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create an "invalid request" error for bodies that cannot be parsed
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new("invalid_request", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::RateLimited => 429,

            // Upstream statuses pass through when they are in the expected class
            Error::UpstreamClient { status, .. } if (400..500).contains(status) => *status,
            Error::UpstreamClient { .. } => 400,
            Error::UpstreamServer { status, .. } if (500..600).contains(status) => *status,
            Error::UpstreamServer { .. } => 502,

            // 502 Bad Gateway - upstream unreachable or unreadable
            Error::Transport(_) => 502,
            Error::Decode(_) => 502,

            Error::Cancelled => 503,

            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation { .. } => "validation_error",
            Error::RateLimited => "rate_limited",
            Error::UpstreamClient { .. } => "upstream_client_error",
            Error::UpstreamServer { .. } => "upstream_server_error",
            Error::Transport(_) => "transport_error",
            Error::Decode(_) => "decode_error",
            Error::Cancelled => "cancelled",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Validation { details, .. } => Some(serde_json::json!(details)),
            Error::UpstreamClient { status, .. } | Error::UpstreamServer { status, .. } => {
                Some(serde_json::json!({
                    "upstream_status": status,
                }))
            }
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

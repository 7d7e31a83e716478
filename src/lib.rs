//! # repo-scout
//!
//! Resilient search over the GitHub repository search API, ranked by a
//! weighted popularity score.
//!
//! ## Pipeline
//!
//! - [`query`] builds the search qualifier and request URI, falling back to
//!   a fixed default URI instead of failing
//! - [`fetch`] issues one page call or a bounded concurrent fan-out, each
//!   call retried on transient upstream failures behind a shared
//!   [`rate_limit::AdmissionGate`]
//! - [`classify`] turns each upstream response into a page or a typed [`Error`]
//! - [`score`] attaches a popularity score to every item in parallel
//! - [`pipeline`] composes the above and recomputes pagination
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_scout::{Config, SearchCriteria, SearchPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = SearchPipeline::new(Config::default())?;
//!
//!     let criteria = SearchCriteria::new().language("Rust").with_page(1);
//!     let page = pipeline.search(&criteria).await?;
//!
//!     for repo in &page.items {
//!         println!("{} {:.1}", repo.name, repo.popularity_score);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Upstream response classification
pub mod classify;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Upstream fetch orchestration
pub mod fetch;
/// Search pipeline
pub mod pipeline;
/// Search query and URI construction
pub mod query;
/// Admission gate (token bucket)
pub mod rate_limit;
/// Retry logic with exponential backoff
pub mod retry;
/// Popularity scoring
pub mod score;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use fetch::{GitHubFetcher, RepositorySource};
pub use pipeline::SearchPipeline;
pub use types::{RepositoryRecord, ResultPage, SearchCriteria};

/// Helper function to serve the API with graceful signal handling.
///
/// Starts the API server and waits for a termination signal. On the signal,
/// in-flight searches stop scheduling upstream calls and the server drains.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use repo_scout::{Config, SearchPipeline, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::from_json_file("repo-scout.json")?;
///     let pipeline = SearchPipeline::new(config)?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(pipeline).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(pipeline: SearchPipeline) -> Result<()> {
    let shutdown = tokio_util::sync::CancellationToken::new();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
    });

    api::start_api_server(pipeline, shutdown).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}

//! Application state for the API server

use crate::SearchPipeline;
use tokio_util::sync::CancellationToken;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones).
#[derive(Clone, Debug)]
pub struct AppState {
    /// The search pipeline every request runs through
    pub pipeline: SearchPipeline,

    /// Fired on server shutdown; in-flight searches stop scheduling new
    /// upstream calls once it is cancelled
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new AppState
    pub fn new(pipeline: SearchPipeline, shutdown: CancellationToken) -> Self {
        Self { pipeline, shutdown }
    }
}

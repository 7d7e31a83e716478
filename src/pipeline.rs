//! Search pipeline: fetch, score, paginate

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{GitHubFetcher, RepositorySource};
use crate::score::score_all;
use crate::types::{ResultPage, SearchCriteria};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Composes a [`RepositorySource`] with parallel scoring and pagination
///
/// Cheap to clone; clones share the source and its admission gate.
#[derive(Clone)]
pub struct SearchPipeline {
    source: Arc<dyn RepositorySource>,
    config: Arc<Config>,
}

impl SearchPipeline {
    /// Build a pipeline backed by the GitHub search API
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let fetcher = GitHubFetcher::new(config.clone())?;
        Ok(Self::with_source(Arc::new(fetcher), config))
    }

    /// Build a pipeline over any repository source
    pub fn with_source(source: Arc<dyn RepositorySource>, config: Arc<Config>) -> Self {
        Self { source, config }
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a search
    ///
    /// Failures from the source propagate unchanged.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<ResultPage> {
        self.search_with_cancel(criteria, &CancellationToken::new())
            .await
    }

    /// Run a search, observing `cancel` between upstream calls
    pub async fn search_with_cancel(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancellationToken,
    ) -> Result<ResultPage> {
        tracing::info!(
            language = ?criteria.language,
            created_since = ?criteria.earliest_created_date,
            page = ?criteria.page_number,
            "Searching repositories"
        );

        let fetched = self.source.fetch_repositories(criteria, cancel).await?;
        let items = score_all(fetched.items, Utc::now()).await;

        let current = criteria
            .page_number
            .unwrap_or(self.config.github.default_page);

        // A fan-out already holds every reachable page, so it never has a successor
        let (has_next_page, next_page_number) = match criteria.page_number {
            Some(_) => paginate(
                fetched.total_count,
                self.config.github.default_per_page,
                current,
            ),
            None => (false, None),
        };

        tracing::info!(
            items = items.len(),
            total_count = fetched.total_count,
            page = current,
            has_next_page,
            "Search completed"
        );

        Ok(ResultPage {
            total_count: fetched.total_count,
            incomplete_results: fetched.incomplete_results,
            has_next_page,
            page_number: Some(current),
            next_page_number,
            items,
        })
    }
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("base_url", &self.config.github.base_url)
            .finish_non_exhaustive()
    }
}

/// `(has_next_page, next_page_number)` for `current` of `ceil(total / per_page)` pages
fn paginate(total_count: u64, per_page: u32, current: u32) -> (bool, Option<u32>) {
    let total_pages = total_count.div_ceil(u64::from(per_page.max(1)));
    let has_next = u64::from(current) < total_pages;
    let next = if has_next { current.checked_add(1) } else { None };
    (next.is_some(), next)
}

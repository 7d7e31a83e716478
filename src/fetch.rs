//! Upstream fetch orchestration
//!
//! One explicit page is fetched as-is. Without a page, the fetcher fans out
//! concurrently over `1..=max_fan_out_pages` and aggregates the results.
//! Every page call is retried on transient server failures, and the whole
//! fetch sits behind the shared [`AdmissionGate`].

use crate::classify::classify_response;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::{build_search_query, build_uri};
use crate::rate_limit::AdmissionGate;
use crate::retry::with_retry;
use crate::types::{RepositoryRecord, ResultPage, SearchCriteria};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// A source of repository result pages
///
/// Implemented by [`GitHubFetcher`]; the pipeline depends only on this
/// trait so it can run against any source.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetch the page(s) selected by `criteria`
    ///
    /// # Errors
    ///
    /// Returns [`Error::RateLimited`] when admission is refused,
    /// [`Error::Cancelled`] when `cancel` fired before work was scheduled, or
    /// the upstream failure that ended the fetch.
    async fn fetch_repositories(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancellationToken,
    ) -> Result<ResultPage>;
}

/// Fetcher for the GitHub repository search API
pub struct GitHubFetcher {
    /// HTTP client with default headers and timeout applied
    client: reqwest::Client,

    /// Shared configuration
    config: Arc<Config>,

    /// Admission gate shared across concurrent fetches
    gate: Arc<AdmissionGate>,
}

impl GitHubFetcher {
    /// Create a fetcher with its own admission gate built from `config.rate_limit`
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the token is not a valid header value or
    /// the HTTP client cannot be created
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let gate = Arc::new(AdmissionGate::new(&config.rate_limit));
        Self::with_gate(config, gate)
    }

    /// Create a fetcher that shares an existing admission gate
    ///
    /// # Errors
    /// Same as [`GitHubFetcher::new`]
    pub fn with_gate(config: Arc<Config>, gate: Arc<AdmissionGate>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        if let Some(token) = config.github.token.as_deref() {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| Error::Config {
                    message: format!("token is not a valid header value: {e}"),
                    key: Some("github.token".into()),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.github.request_timeout)
            .user_agent(concat!("repo-scout/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {e}"),
                key: None,
            })?;

        Ok(Self {
            client,
            config,
            gate,
        })
    }

    /// Fetch the page(s) selected by `criteria`
    pub async fn fetch(&self, criteria: &SearchCriteria) -> Result<ResultPage> {
        self.fetch_with_cancel(criteria, &CancellationToken::new())
            .await
    }

    /// Fetch the page(s) selected by `criteria`, observing `cancel`
    ///
    /// The admission gate is consulted once, before any HTTP traffic. A
    /// rejection fails fast with [`Error::RateLimited`] and is never retried.
    pub async fn fetch_with_cancel(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancellationToken,
    ) -> Result<ResultPage> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if let Some(retry_after) = self.gate.check().await {
            tracing::warn!(
                retry_after_ms = retry_after.as_millis(),
                "Admission gate rejected search"
            );
            return Err(Error::RateLimited);
        }

        match criteria.page_number {
            Some(page) => {
                tracing::info!(page, "Fetching single page");
                let result = self.fetch_page(criteria, cancel).await?;
                Ok(result
                    .map(|p| ResultPage {
                        page_number: Some(page),
                        ..p
                    })
                    .unwrap_or_else(|| ResultPage::empty(Some(page))))
            }
            None => self.fan_out(criteria, cancel).await,
        }
    }

    async fn fan_out(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancellationToken,
    ) -> Result<ResultPage> {
        // Every page of an unfiltered search resolves to the same fallback URI
        if build_search_query(criteria).trim().is_empty() {
            tracing::info!("No search filters supplied, fetching fallback query once");
            let result = self.fetch_page(criteria, cancel).await?;
            return Ok(aggregate(criteria, result.into_iter().collect()));
        }

        let pages = self.config.github.max_fan_out_pages;
        tracing::info!(pages, "Fanning out across pages");

        let requests = (1..=pages).map(|page| {
            let paged = criteria.with_page(page);
            async move {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                self.fetch_page(&paged, cancel).await
            }
        });

        // try_join_all keeps input order, so page order is preserved
        let results = try_join_all(requests).await?;
        let aggregated = aggregate(criteria, results.into_iter().flatten().collect());

        tracing::info!(
            items = aggregated.items.len(),
            pages,
            "Aggregated fan-out results"
        );

        Ok(aggregated)
    }

    /// One page call wrapped in the retry policy
    async fn fetch_page(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancellationToken,
    ) -> Result<Option<ResultPage>> {
        let uri = build_uri(&self.config.github, criteria);
        with_retry(&self.config.retry, cancel, || self.fetch_once(&uri)).await
    }

    async fn fetch_once(&self, uri: &str) -> Result<Option<ResultPage>> {
        tracing::debug!(uri, "Calling GitHub search API");
        let response = self.client.get(uri).send().await?;
        classify_response(response, self.config.github.max_body_bytes).await
    }
}

/// Concatenate non-empty pages in order into one page with no successor
fn aggregate(criteria: &SearchCriteria, pages: Vec<ResultPage>) -> ResultPage {
    let items: Vec<RepositoryRecord> = pages
        .into_iter()
        .filter(|page| !page.items.is_empty())
        .flat_map(|page| page.items)
        .collect();

    ResultPage {
        total_count: items.len() as u64,
        incomplete_results: false,
        has_next_page: false,
        page_number: criteria.page_number,
        next_page_number: None,
        items,
    }
}

#[async_trait]
impl RepositorySource for GitHubFetcher {
    async fn fetch_repositories(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancellationToken,
    ) -> Result<ResultPage> {
        self.fetch_with_cancel(criteria, cancel).await
    }
}

impl std::fmt::Debug for GitHubFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubFetcher")
            .field("base_url", &self.config.github.base_url)
            .field("gate", &self.gate)
            .finish()
    }
}

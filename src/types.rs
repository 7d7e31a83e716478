//! Core types for repo-scout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Search filters supplied by a caller
///
/// Immutable once built. Fan-out derives copies with a different page
/// number through [`SearchCriteria::with_page`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Programming language to filter by, e.g. "Java" or "C++ Rust"
    #[serde(default)]
    #[schema(example = "Java")]
    pub language: Option<String>,

    /// Earliest creation date (ISO-8601)
    #[serde(default)]
    #[schema(value_type = Option<String>, format = DateTime, example = "2025-10-16T22:29:00Z")]
    pub earliest_created_date: Option<DateTime<Utc>>,

    /// Page number, starting at 1
    #[serde(default)]
    #[schema(example = 1, minimum = 1)]
    pub page_number: Option<u32>,
}

impl SearchCriteria {
    /// Criteria with no filters and no explicit page
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language filter
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the earliest creation date filter
    #[must_use]
    pub fn created_since(mut self, date: DateTime<Utc>) -> Self {
        self.earliest_created_date = Some(date);
        self
    }

    /// Copy of these criteria targeting `page`
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page_number: Some(page),
            ..self.clone()
        }
    }
}

/// One repository returned by the search API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    /// Upstream repository ID
    pub id: i64,
    /// Repository name
    pub name: String,
    /// Repository description
    pub description: Option<String>,
    /// Primary programming language
    pub language: Option<String>,
    /// Number of stargazers
    #[serde(rename = "stargazerCount")]
    pub star_count: u64,
    /// Number of forks
    #[serde(rename = "forksCount")]
    pub fork_count: u64,
    /// Repository web URL
    #[serde(rename = "htmlUrl")]
    pub url: String,
    /// Last update timestamp
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    #[schema(value_type = Option<String>, format = DateTime)]
    pub created_at: Option<DateTime<Utc>>,
    /// Calculated popularity score (0 until scored)
    #[serde(default)]
    pub popularity_score: f64,
}

/// A page of search results
///
/// `next_page_number` is present exactly when `has_next_page` is true and
/// `page_number` is known.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    /// Total number of repositories matching the search query
    pub total_count: u64,
    /// True if the upstream search timed out before finding every match
    pub incomplete_results: bool,
    /// True if there is at least one more page after this one
    pub has_next_page: bool,
    /// Current page number
    #[serde(rename = "currentPageNumber")]
    pub page_number: Option<u32>,
    /// Next page number, or null if there is no next page
    pub next_page_number: Option<u32>,
    /// Repositories in this page, in upstream order
    pub items: Vec<RepositoryRecord>,
}

impl ResultPage {
    /// A page with no items and no successor
    pub fn empty(page_number: Option<u32>) -> Self {
        Self {
            total_count: 0,
            incomplete_results: false,
            has_next_page: false,
            page_number,
            next_page_number: None,
            items: Vec::new(),
        }
    }
}

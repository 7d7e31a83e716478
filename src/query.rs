//! Search query and request URI construction
//!
//! Both builders are total: a criteria value that cannot produce a usable
//! request degrades to a fixed fallback built from configured defaults.

use crate::config::GitHubConfig;
use crate::types::SearchCriteria;
use chrono::SecondsFormat;

const SEARCH_PATH: &str = "/search/repositories";

/// Build the search qualifier string for `criteria`
///
/// Produces `language:<lang>`, `created:>=<instant>`, or both joined by `+`.
/// Blank or absent fields are omitted; no filters yields `""`.
///
/// # Example
///
/// ```
/// use repo_scout::query::build_search_query;
/// use repo_scout::SearchCriteria;
///
/// let criteria = SearchCriteria::new().language("Rust");
/// assert_eq!(build_search_query(&criteria), "language:Rust");
/// ```
pub fn build_search_query(criteria: &SearchCriteria) -> String {
    clauses(criteria, |value| value.to_string()).join("+")
}

/// Build the full upstream request URI for `criteria`
///
/// The page is the criteria's page or the configured default. A blank query,
/// a zero page, or a candidate that does not parse as an absolute URL all
/// produce [`fallback_uri`].
pub fn build_uri(config: &GitHubConfig, criteria: &SearchCriteria) -> String {
    let query = clauses(criteria, escape_query_value).join("+");

    if query.trim().is_empty() {
        let fallback = fallback_uri(config);
        tracing::debug!(uri = %fallback, "No search filters supplied, using fallback URI");
        return fallback;
    }

    let page = criteria.page_number.unwrap_or(config.default_page);
    if page == 0 {
        let fallback = fallback_uri(config);
        tracing::warn!(uri = %fallback, "Page number 0 is not addressable, using fallback URI");
        return fallback;
    }

    let candidate = format!(
        "{}{}?q={}&page={}&per_page={}",
        base_url(config),
        SEARCH_PATH,
        query,
        page,
        config.default_per_page
    );

    match url::Url::parse(&candidate) {
        Ok(_) => {
            tracing::debug!(uri = %candidate, "Built search URI");
            candidate
        }
        Err(e) => {
            let fallback = fallback_uri(config);
            tracing::error!(error = %e, uri = %fallback, "Failed to build search URI, using fallback URI");
            fallback
        }
    }
}

/// The fixed URI used when no valid query can be built
///
/// Always uses the configured default query, page and per-page values.
pub fn fallback_uri(config: &GitHubConfig) -> String {
    format!(
        "{}{}?q={}&page={}&per_page={}",
        base_url(config),
        SEARCH_PATH,
        config.default_query,
        config.default_page,
        config.default_per_page
    )
}

fn base_url(config: &GitHubConfig) -> &str {
    config.base_url.trim_end_matches('/')
}

fn clauses(criteria: &SearchCriteria, render: impl Fn(&str) -> String) -> Vec<String> {
    let mut clauses = Vec::with_capacity(2);

    if let Some(language) = criteria.language.as_deref().map(str::trim) {
        if !language.is_empty() {
            clauses.push(format!("language:{}", render(language)));
        }
    }

    if let Some(created) = criteria.earliest_created_date {
        let instant = created.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        clauses.push(format!("created:>={}", render(&instant)));
    }

    clauses
}

/// Percent-encode a clause value so characters like `#`, `&` or `+` cannot
/// change the meaning of the query component
fn escape_query_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

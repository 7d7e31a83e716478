//! Common test utilities for repo-scout integration tests

#![allow(dead_code)]

use repo_scout::Config;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at `base_url` with fast, jitter-free retries and the
/// admission gate disabled
pub fn mock_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.github.base_url = base_url.to_string();
    config.github.default_per_page = 10;
    config.github.max_fan_out_pages = 3;
    config.retry.max_attempts = 2;
    config.retry.initial_delay = Duration::from_millis(5);
    config.retry.max_delay = Duration::from_millis(20);
    config.retry.jitter = false;
    config.rate_limit.enabled = false;
    config
}

/// One upstream item as the search API returns it
pub fn upstream_item(id: i64, stars: u64, forks: u64, updated_at: &str) -> Value {
    json!({
        "id": id,
        "name": format!("repo-{id}"),
        "description": format!("repository {id}"),
        "language": "Rust",
        "stargazers_count": stars,
        "forks_count": forks,
        "html_url": format!("https://github.com/o/repo-{id}"),
        "updated_at": updated_at,
        "created_at": "2020-01-01T00:00:00Z"
    })
}

/// A search response body
pub fn upstream_page(total_count: u64, items: Vec<Value>) -> Value {
    json!({
        "total_count": total_count,
        "incomplete_results": false,
        "items": items
    })
}

/// Mount a 200 response for one page of /search/repositories
pub async fn mount_page(server: &MockServer, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

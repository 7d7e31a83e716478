use super::*;
use crate::Config;
use crate::error::{ApiError, Error};
use crate::fetch::RepositorySource;
use crate::types::{RepositoryRecord, ResultPage, SearchCriteria};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;


/// Source that answers every call from a fixed responder
struct FixedSource {
    respond: Box<dyn Fn() -> crate::Result<ResultPage> + Send + Sync>,
    calls: Mutex<Vec<SearchCriteria>>,
}

impl FixedSource {
    fn page(page: ResultPage) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(move || Ok(page.clone())),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(fail: fn() -> Error) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(move || Err(fail())),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> Option<SearchCriteria> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RepositorySource for FixedSource {
    async fn fetch_repositories(
        &self,
        criteria: &SearchCriteria,
        _cancel: &CancellationToken,
    ) -> crate::Result<ResultPage> {
        self.calls.lock().unwrap().push(criteria.clone());
        (self.respond)()
    }
}

fn record(id: i64, stars: u64) -> RepositoryRecord {
    RepositoryRecord {
        id,
        name: format!("repo-{id}"),
        description: Some("a repository".into()),
        language: Some("Java".into()),
        star_count: stars,
        fork_count: 1,
        url: format!("https://github.com/o/repo-{id}"),
        updated_at: None,
        created_at: None,
        popularity_score: 0.0,
    }
}

fn two_item_page() -> ResultPage {
    ResultPage {
        total_count: 2,
        incomplete_results: false,
        has_next_page: false,
        page_number: None,
        next_page_number: None,
        items: vec![record(1, 100), record(2, 5)],
    }
}

fn test_config() -> Arc<Config> {
    let mut config = Config::default();
    config.github.default_per_page = 10;
    Arc::new(config)
}

fn router_with(source: Arc<dyn RepositorySource>) -> Router {
    let pipeline = SearchPipeline::with_source(source, test_config());
    create_router(pipeline, CancellationToken::new())
}

fn post_search(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/search")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns_and_stops_on_shutdown() {
    let mut config = Config::default();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let pipeline = SearchPipeline::new(config).unwrap();
    let shutdown = CancellationToken::new();

    let api_handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { start_api_server(pipeline, shutdown).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = router_with(FixedSource::page(two_item_page()));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = (*test_config()).clone();
    config.api.cors_enabled = false;
    let pipeline =
        SearchPipeline::with_source(FixedSource::page(two_item_page()), Arc::new(config));
    let app = create_router(pipeline, CancellationToken::new());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[test]
fn test_cors_specific_origins() {
    // Should not panic with a mix of valid and unparsable origins
    let _layer = build_cors_layer(&[
        "http://localhost:3000".to_string(),
        "bad\norigin".to_string(),
    ]);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = router_with(FixedSource::page(two_item_page()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_body_shape() {
    let app = router_with(FixedSource::failing(|| Error::RateLimited));

    let response = app.oneshot(post_search("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let api_error: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(api_error.error.code, "rate_limited");
}

// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /sources
// - GET /search (happy path, degraded source, invalid query)

use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use job_search_aggregator::search::providers::mock::{MockBehavior, MockBoard};
use job_search_aggregator::{create_router, AggregationEngine, AppState, FailureReason};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    let engine = AggregationEngine::builder()
        .per_adapter_timeout(Duration::from_millis(200))
        .adapter(MockBoard::new("indeed", 4))
        .adapter(MockBoard::new("ziprecruiter", 2))
        .adapter(
            MockBoard::new("monster", 3)
                .with_behavior(MockBehavior::Fail(FailureReason::RateLimited)),
        )
        .build()
        .expect("engine");
    create_router(AppState::new(engine))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, body) = get(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "ok");
}

#[tokio::test]
async fn sources_lists_registration_order() {
    let (status, body) = get(test_router(), "/sources").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["count"], 3);
    assert_eq!(
        v["sources"],
        serde_json::json!(["indeed", "ziprecruiter", "monster"])
    );
}

#[tokio::test]
async fn search_returns_deduped_postings_and_source_report() {
    let (status, body) = get(
        test_router(),
        "/search?keywords=Rust%20Engineer&location=Remote",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", String::from_utf8_lossy(&body));

    let v: Json = serde_json::from_slice(&body).unwrap();
    let postings = v["postings"].as_array().expect("postings array");
    // ziprecruiter's two postings share urls with indeed's first two
    assert_eq!(postings.len(), 4);
    assert_eq!(v["duplicates_removed"], 2);
    assert!(postings.iter().all(|p| p["source_name"] == "indeed"));
    assert_eq!(postings[0]["title"], "Senior Rust Engineer");
    assert_eq!(postings[0]["location"], "Remote");

    let sources = v["sources"].as_array().expect("sources array");
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0]["status"], "SUCCESS");
    assert_eq!(sources[2]["source"], "monster");
    assert_eq!(sources[2]["status"], "FAILURE");
    assert_eq!(sources[2]["reason"], "RATE_LIMITED");
}

#[tokio::test]
async fn search_honors_limit_and_per_source() {
    let (status, body) = get(test_router(), "/search?keywords=rust&per_source=1&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["postings"].as_array().unwrap().len(), 1);
    assert_eq!(v["sources"][0]["fetched"], 1);
}

#[tokio::test]
async fn missing_keywords_is_bad_request() {
    let (status, body) = get(test_router(), "/search?location=Berlin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert!(v["error"].as_str().unwrap().contains("invalid query"));
}

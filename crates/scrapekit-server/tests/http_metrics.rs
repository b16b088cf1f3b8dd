//! End-to-end: requests through the router show up in the next scrape.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use scrapekit_core::{ErrorCode, MetricDescriptor, MetricRegistry};
use scrapekit_server::app_state::AppState;
use scrapekit_server::config::{self, AppConfig};
use scrapekit_server::router::build_router;

fn create_test_state() -> AppState {
    AppState::new(AppConfig::default()).unwrap()
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn series_value(scrape: &str, series: &str) -> Option<f64> {
    scrape
        .lines()
        .find_map(|l| l.strip_prefix(series)?.strip_prefix(' '))
        .map(|v| v.parse().unwrap())
}

#[tokio::test]
async fn metrics_endpoint_content_type() {
    let router = build_router(create_test_state());
    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );
}

#[tokio::test]
async fn root_request_is_counted_once() {
    let state = create_test_state();
    let router = build_router(state.clone());

    let (_, before) = get(&router, "/metrics").await;
    let req_series = r#"http_requests_total{method="GET",route="/",status="200"}"#;
    let count_series = r#"http_request_duration_seconds_count{method="GET",route="/"}"#;
    assert_eq!(series_value(&before, req_series), None);

    let (status, body) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("hello from monitoring app"));

    let (_, after) = get(&router, "/metrics").await;
    assert_eq!(series_value(&after, req_series), Some(1.0));
    assert_eq!(series_value(&after, count_series), Some(1.0));

    let labels = [("method", "GET"), ("route", "/"), ("status", "200")];
    assert_eq!(state.http_metrics().requests().value(&labels).unwrap(), 1);
}

#[tokio::test]
async fn error_responses_are_counted() {
    let state = create_test_state();
    let router = build_router(state.clone());

    let (status, body) = get(&router, "/error").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("internal server error"));

    let (_, scrape) = get(&router, "/metrics").await;
    assert_eq!(
        series_value(
            &scrape,
            r#"http_requests_total{method="GET",route="/error",status="500"}"#
        ),
        Some(1.0)
    );
    assert_eq!(
        series_value(
            &scrape,
            r#"http_request_duration_seconds_count{method="GET",route="/error"}"#
        ),
        Some(1.0)
    );
}

#[tokio::test]
async fn unmatched_paths_share_one_route_label() {
    let state = create_test_state();
    let router = build_router(state.clone());

    for uri in ["/users/1", "/users/2", "/nope?x=1"] {
        let (status, _) = get(&router, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let labels = [("method", "GET"), ("route", "unmatched"), ("status", "404")];
    assert_eq!(state.http_metrics().requests().value(&labels).unwrap(), 3);
    // One series for all three raw paths.
    assert_eq!(state.http_metrics().requests().series_count(), 1);
}

#[tokio::test]
async fn scrapes_are_instrumented_too() {
    let state = create_test_state();
    let router = build_router(state.clone());

    get(&router, "/metrics").await;
    let (_, scrape) = get(&router, "/metrics").await;
    assert_eq!(
        series_value(
            &scrape,
            r#"http_requests_total{method="GET",route="/metrics",status="200"}"#
        ),
        Some(1.0)
    );
}

#[tokio::test]
async fn health_reports_uptime() {
    let router = build_router(create_test_state());
    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "healthy");
    assert!(v["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn scrape_includes_process_uptime() {
    let router = build_router(create_test_state());
    let (_, scrape) = get(&router, "/metrics").await;
    assert!(scrape.contains("# TYPE process_uptime_seconds gauge\n"));
    assert!(series_value(&scrape, "process_uptime_seconds").is_some());
}

#[tokio::test]
async fn slow_request_lands_in_matching_bucket() {
    let state = create_test_state();
    let router = build_router(state.clone());

    let (status, body) = get(&router, "/slow").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("this took 2 seconds"));

    let snap = state
        .http_metrics()
        .duration()
        .snapshot(&[("method", "GET"), ("route", "/slow")])
        .unwrap()
        .expect("series exists");
    assert_eq!(snap.count, 1);
    assert!(snap.sum >= 2.0, "observed {}", snap.sum);
    assert!(snap.sum < 3.0, "observed {}", snap.sum);
    for (le, count) in snap.buckets() {
        let expected = u64::from(snap.sum <= le);
        assert_eq!(count, expected, "bucket le={le}");
    }
    // Under normal scheduling the 2s request sits in the 2.5 bucket.
    assert_eq!(snap.buckets().find(|(le, _)| *le == 1.0).unwrap().1, 0);
}

#[tokio::test]
async fn slow_message_reports_configured_delay() {
    let cfg = config::load_from_str("version: 1\nserver:\n  slow_delay_ms: 250\n").unwrap();
    let router = build_router(AppState::new(cfg).unwrap());

    let (status, body) = get(&router, "/slow").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["message"], "this took 0.25 seconds");
}

#[tokio::test]
async fn custom_buckets_from_config() {
    let cfg = config::load_from_str("version: 1\nmetrics:\n  duration_buckets: [0.5, 1.5]\n").unwrap();
    let router = build_router(AppState::new(cfg).unwrap());

    get(&router, "/").await;
    let (_, scrape) = get(&router, "/metrics").await;
    assert!(scrape.contains(r#"http_request_duration_seconds_bucket{method="GET",route="/",le="0.5"} 1"#));
    assert!(scrape.contains(r#"http_request_duration_seconds_bucket{method="GET",route="/",le="1.5"} 1"#));
    assert!(scrape.contains(r#"http_request_duration_seconds_bucket{method="GET",route="/",le="+Inf"} 1"#));
}

#[test]
fn startup_fails_on_duplicate_metric_name() {
    let registry = Arc::new(MetricRegistry::new());
    registry
        .register(MetricDescriptor::counter(
            "http_requests_total",
            "already here",
            &[],
        ))
        .unwrap();

    let err = AppState::with_registry(AppConfig::default(), registry.clone())
        .err()
        .expect("must fail");
    assert_eq!(err.code(), ErrorCode::DuplicateMetricName);
    assert_eq!(registry.names(), vec!["http_requests_total"]);
}

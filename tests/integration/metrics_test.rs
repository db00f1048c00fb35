//! Integration tests for request metrics and the domain counters, including
//! requests that an earlier stage of the chain short-circuits.

mod helpers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use metrics::{SharedString, Unit};
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use metrics_util::{CompositeKey, MetricKind};

use edgeguard_core::config::RatePolicyKind;
use helpers::{PASSWORD, TestApp};

type Snapshot = Vec<(CompositeKey, Option<Unit>, Option<SharedString>, DebugValue)>;

fn has_labels(key: &CompositeKey, name: &str, labels: &[(&str, &str)]) -> bool {
    key.key().name() == name
        && labels.iter().all(|(k, v)| {
            key.key()
                .labels()
                .any(|label| label.key() == *k && label.value() == *v)
        })
}

/// Sum of every counter named `name` carrying all of `labels`.
fn counter(snapshot: &Snapshot, name: &str, labels: &[(&str, &str)]) -> u64 {
    snapshot
        .iter()
        .filter(|(key, ..)| key.kind() == MetricKind::Counter && has_labels(key, name, labels))
        .map(|(.., value)| match value {
            DebugValue::Counter(n) => *n,
            _ => 0,
        })
        .sum()
}

/// Number of samples in histograms named `name` carrying all of `labels`.
fn samples(snapshot: &Snapshot, name: &str, labels: &[(&str, &str)]) -> usize {
    snapshot
        .iter()
        .filter(|(key, ..)| key.kind() == MetricKind::Histogram && has_labels(key, name, labels))
        .map(|(.., value)| match value {
            DebugValue::Histogram(values) => values.len(),
            _ => 0,
        })
        .sum()
}

#[tokio::test]
async fn test_rate_denial_is_recorded() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let app = TestApp::with_config(|config| {
        config.rate_limit.max_requests = 2;
        config.rate_limit.public_policy = RatePolicyKind::Standard;
    })
    .await;

    for _ in 0..2 {
        let response = app.request("GET", "/api/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    let snapshot = snapshotter.snapshot().into_vec();
    let admitted = [("method", "GET"), ("route", "/api/health"), ("status", "200")];
    let denied = [("method", "GET"), ("route", "/api/health"), ("status", "429")];
    assert_eq!(counter(&snapshot, "http_requests_total", &admitted), 2);
    assert_eq!(counter(&snapshot, "http_requests_total", &denied), 1);
    assert_eq!(samples(&snapshot, "http_request_duration_seconds", &denied), 1);
    assert_eq!(
        counter(&snapshot, "rate_limit_denied_total", &[("route", "/api/health")]),
        1
    );
}

#[tokio::test]
async fn test_auth_rejection_is_recorded() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let app = TestApp::new().await;
    let bob = app.login("bob", PASSWORD).await;

    let response = app.request("GET", "/api/auth/sessions", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let response = app
        .request("GET", "/api/admin/users", None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let snapshot = snapshotter.snapshot().into_vec();
    let unauthenticated = [("route", "/api/auth/*"), ("status", "401")];
    let forbidden = [("route", "/api/admin/*"), ("status", "403")];
    assert_eq!(counter(&snapshot, "http_requests_total", &unauthenticated), 1);
    assert_eq!(samples(&snapshot, "http_request_duration_seconds", &unauthenticated), 1);
    assert_eq!(counter(&snapshot, "http_requests_total", &forbidden), 1);
    assert_eq!(counter(&snapshot, "auth_rejections_total", &[("code", "NO_TOKEN")]), 1);
    assert_eq!(counter(&snapshot, "auth_rejections_total", &[("code", "ACCESS_DENIED")]), 1);
}

#[tokio::test]
async fn test_refused_path_is_recorded() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let app = TestApp::new().await;
    let response = app
        .request("GET", "/api/orders/%2e%2e/admin/users", None, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter(&snapshot, "http_requests_total", &[("status", "400")]), 1);
}

async fn explode() -> &'static str {
    panic!("handler exploded")
}

#[tokio::test]
async fn test_panicking_handler_is_recorded_as_500() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let routes = Router::new().route("/api/explode", get(explode));
    let app = TestApp::with_routes(
        |config| config.auth.public_paths.push("/api/explode".to_string()),
        routes,
    )
    .await;

    let response = app.request("GET", "/api/explode", None, None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["path"], "/api/explode");
    assert!(response.body["traceId"].as_str().is_some());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter(&snapshot, "http_requests_total", &[("route", "/api/explode"), ("status", "500")]),
        1
    );
}

#[tokio::test]
async fn test_session_renewal_is_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    // Well inside the window: no renewal.
    app.advance(Duration::from_secs(60));
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    // 599s left, under the 600s threshold.
    app.advance(Duration::from_secs(2941));
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter(&snapshot, "session_renewals_total", &[]), 1);
}

#[tokio::test]
async fn test_fail_open_admission_is_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let app = TestApp::with_cache_down();
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter(&snapshot, "rate_limit_fail_open_total", &[]), 1);
    assert_eq!(
        counter(&snapshot, "http_requests_total", &[("route", "/api/health"), ("status", "200")]),
        1
    );
}

//! Integration tests for fixed-window rate admission at the edge.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use axum::http::request::Builder;

use edgeguard_core::config::{RatePolicyKind, RouteRuleConfig};
use helpers::{TestApp, TestResponse};

async fn app_with_cap(cap: u64) -> TestApp {
    TestApp::with_config(|config| {
        config.server.trust_forwarded_for = true;
        config.rate_limit.max_requests = cap;
        config.rate_limit.window_seconds = 60;
        config.rate_limit.public_policy = RatePolicyKind::Standard;
        config.auth.routes.push(RouteRuleConfig {
            pattern: "/internal/*".to_string(),
            requires_auth: false,
            roles: vec![],
            permissions: vec![],
            rate: Some(RatePolicyKind::Bypass),
        });
    })
    .await
}

async fn get_from(app: &TestApp, client: &str, path: &str) -> TestResponse {
    app.send(
        Builder::new()
            .method("GET")
            .uri(path)
            .header("X-Forwarded-For", client),
        None,
    )
    .await
}

#[tokio::test]
async fn test_cap_then_429_with_retry_after() {
    let app = app_with_cap(3).await;

    for _ in 0..3 {
        let response = get_from(&app, "203.0.113.7", "/api/health").await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = get_from(&app, "203.0.113.7", "/api/health").await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.code(), "RATE_LIMITED");
    assert_eq!(response.header("retry-after"), Some("60"));
    assert_eq!(response.body["path"], "/api/health");
    assert!(response.body["traceId"].as_str().is_some());
}

#[tokio::test]
async fn test_window_resets() {
    let app = app_with_cap(2).await;

    for _ in 0..2 {
        assert_eq!(
            get_from(&app, "203.0.113.7", "/api/health").await.status,
            StatusCode::OK
        );
    }
    assert_eq!(
        get_from(&app, "203.0.113.7", "/api/health").await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    app.advance(Duration::from_secs(61));

    assert_eq!(
        get_from(&app, "203.0.113.7", "/api/health").await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_budgets_are_per_client_and_route() {
    let app = app_with_cap(1).await;

    assert_eq!(
        get_from(&app, "203.0.113.7", "/api/health").await.status,
        StatusCode::OK
    );
    assert_eq!(
        get_from(&app, "203.0.113.7", "/api/health").await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Another client has its own budget.
    assert_eq!(
        get_from(&app, "198.51.100.20", "/api/health").await.status,
        StatusCode::OK
    );

    // Another route pattern has its own budget.
    assert_eq!(
        get_from(&app, "203.0.113.7", "/docs/index.html").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_rate_check_runs_before_auth() {
    let app = app_with_cap(2).await;

    for _ in 0..2 {
        let response = get_from(&app, "203.0.113.7", "/orders/1").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let response = get_from(&app, "203.0.113.7", "/orders/1").await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_relaxed_policy_multiplies_cap() {
    let app = TestApp::with_config(|config| {
        config.server.trust_forwarded_for = true;
        config.rate_limit.max_requests = 2;
        config.rate_limit.relaxed_multiplier = 3;
        config.rate_limit.public_policy = RatePolicyKind::Relaxed;
    })
    .await;

    for _ in 0..6 {
        assert_eq!(
            get_from(&app, "203.0.113.7", "/api/health").await.status,
            StatusCode::OK
        );
    }
    assert_eq!(
        get_from(&app, "203.0.113.7", "/api/health").await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_bypass_route_is_never_limited() {
    let app = app_with_cap(1).await;

    for _ in 0..5 {
        let response = get_from(&app, "203.0.113.7", "/internal/status").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_disabled_admits_everything() {
    let app = TestApp::with_config(|config| {
        config.server.trust_forwarded_for = true;
        config.rate_limit.enabled = false;
        config.rate_limit.max_requests = 1;
    })
    .await;

    for _ in 0..5 {
        assert_eq!(
            get_from(&app, "203.0.113.7", "/api/health").await.status,
            StatusCode::OK
        );
    }
}

#[tokio::test]
async fn test_untrusted_forwarded_for_is_ignored() {
    let app = TestApp::with_config(|config| {
        config.rate_limit.max_requests = 1;
        config.rate_limit.public_policy = RatePolicyKind::Standard;
    })
    .await;

    assert_eq!(
        get_from(&app, "203.0.113.7", "/api/health").await.status,
        StatusCode::OK
    );
    // A different spoofed address does not earn a fresh budget.
    assert_eq!(
        get_from(&app, "198.51.100.20", "/api/health").await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}

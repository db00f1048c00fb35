//! Integration tests for the login / validate / logout flow.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use axum::http::request::Builder;

use helpers::{PASSWORD, T0, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "alice",
                "password": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert!(data["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(data["token_type"], "Bearer");
    assert!(data["session_id"].as_str().is_some());
    assert!(data["expires_at"].as_str().is_some());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "alice",
                "password": "wrongpassword",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "nobody",
                "password": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_rejects_malformed_body() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "alice" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "VALIDATION");

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "  ", "password": "" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["user_id"], "u-alice");
    assert_eq!(response.body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_me_without_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "NO_TOKEN");
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    let signature_start = token.rfind('.').expect("no signature segment") + 1;
    let idx = signature_start + 5;
    let flipped = if &token[idx..=idx] == "A" { "B" } else { "A" };
    let tampered = format!("{}{}{}", &token[..idx], flipped, &token[idx + 1..]);

    let response = app
        .request("GET", "/api/auth/me", None, Some(&tampered))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "INVALID_SIGNATURE");

    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "MALFORMED_TOKEN");
}

#[tokio::test]
async fn test_wrong_scheme_rejected() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    let response = app
        .send(
            Builder::new()
                .method("GET")
                .uri("/api/auth/me")
                .header("Authorization", format!("Basic {token}")),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "UNSUPPORTED_SCHEME");
}

#[tokio::test]
async fn test_logout_is_immediate() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "SESSION_NOT_FOUND");

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_idle_session_lapses() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    app.advance(Duration::from_secs(3600) + Duration::from_millis(1));

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_activity_keeps_session_alive() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    // Five requests 55 minutes apart: each lands inside the renewal threshold.
    for _ in 0..5 {
        app.advance(Duration::from_secs(55 * 60));
        let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_absolute_ceiling_ends_active_session() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    for _ in 0..183 {
        app.advance(Duration::from_secs(55 * 60));
        let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    app.clock.set(T0 + 7 * 24 * 3600 * 1000 + 1000);
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "SESSION_EXPIRED_ABSOLUTE");

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.code(), "SESSION_NOT_FOUND");
}

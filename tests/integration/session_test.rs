//! Integration tests for multi-device session management.

mod helpers;

use axum::http::StatusCode;
use axum::http::request::Builder;
use serde_json::Value;

use helpers::{PASSWORD, TestApp};

const DESKTOP_FIREFOX: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";
const IPHONE_SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

async fn login_with_agent(app: &TestApp, username: &str, user_agent: &str) -> (String, String) {
    let response = app
        .send(
            Builder::new()
                .method("POST")
                .uri("/api/auth/login")
                .header("User-Agent", user_agent),
            Some(serde_json::json!({ "username": username, "password": PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let data = &response.body["data"];
    (
        data["access_token"].as_str().unwrap_or_default().to_string(),
        data["session_id"].as_str().unwrap_or_default().to_string(),
    )
}

fn sessions(body: &Value) -> &Vec<Value> {
    body["data"].as_array().expect("sessions array")
}

#[tokio::test]
async fn test_list_sessions_across_devices() {
    let app = TestApp::new().await;
    let (laptop, laptop_sid) = login_with_agent(&app, "alice", DESKTOP_FIREFOX).await;
    let (_phone, phone_sid) = login_with_agent(&app, "alice", IPHONE_SAFARI).await;

    let response = app
        .request("GET", "/api/auth/sessions", None, Some(&laptop))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let list = sessions(&response.body);
    assert_eq!(list.len(), 2);

    let laptop_entry = list
        .iter()
        .find(|s| s["session_id"] == laptop_sid.as_str())
        .expect("laptop session listed");
    assert_eq!(laptop_entry["current"], true);
    assert_eq!(laptop_entry["device_class"], "desktop");
    assert_eq!(laptop_entry["browser_class"], "firefox");

    let phone_entry = list
        .iter()
        .find(|s| s["session_id"] == phone_sid.as_str())
        .expect("phone session listed");
    assert_eq!(phone_entry["current"], false);
    assert_eq!(phone_entry["device_class"], "mobile");
    assert_eq!(phone_entry["browser_class"], "safari");
}

#[tokio::test]
async fn test_sessions_are_per_user() {
    let app = TestApp::new().await;
    let alice = app.login("alice", PASSWORD).await;
    let _bob = app.login("bob", PASSWORD).await;

    let response = app
        .request("GET", "/api/auth/sessions", None, Some(&alice))
        .await;
    assert_eq!(sessions(&response.body).len(), 1);
}

#[tokio::test]
async fn test_revoke_other_device() {
    let app = TestApp::new().await;
    let (laptop, _) = login_with_agent(&app, "alice", DESKTOP_FIREFOX).await;
    let (phone, phone_sid) = login_with_agent(&app, "alice", IPHONE_SAFARI).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/auth/sessions/{phone_sid}"),
            None,
            Some(&laptop),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/auth/me", None, Some(&phone)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), "SESSION_NOT_FOUND");

    let response = app.request("GET", "/api/auth/me", None, Some(&laptop)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_cannot_revoke_another_users_session() {
    let app = TestApp::new().await;
    let alice = app.login("alice", PASSWORD).await;
    let (bob, bob_sid) = login_with_agent(&app, "bob", DESKTOP_FIREFOX).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/auth/sessions/{bob_sid}"),
            None,
            Some(&alice),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", "/api/auth/me", None, Some(&bob)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_with_invalid_id() {
    let app = TestApp::new().await;
    let token = app.login("alice", PASSWORD).await;

    let response = app
        .request("DELETE", "/api/auth/sessions/not-a-uuid", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), "VALIDATION");
}

#[tokio::test]
async fn test_revoke_all_sessions() {
    let app = TestApp::new().await;
    let first = app.login("alice", PASSWORD).await;
    let second = app.login("alice", PASSWORD).await;
    let third = app.login("alice", PASSWORD).await;

    let response = app
        .request("DELETE", "/api/auth/sessions", None, Some(&first))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 3);

    for token in [&first, &second, &third] {
        let response = app.request("GET", "/api/auth/me", None, Some(token)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let fresh = app.login("alice", PASSWORD).await;
    let response = app
        .request("GET", "/api/auth/sessions", None, Some(&fresh))
        .await;
    assert_eq!(sessions(&response.body).len(), 1);
}

//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use edgeguard_api::router::build_router;
use edgeguard_api::{AppState, apply_filter_chain, build_app};
use edgeguard_auth::PasswordHasher;
use edgeguard_cache::provider::CacheManager;
use edgeguard_core::config::{AppConfig, DirectoryUserConfig, RouteRuleConfig};
use edgeguard_core::error::AppError;
use edgeguard_core::result::AppResult;
use edgeguard_core::traits::{CacheProvider, Clock, ManualClock};

/// Password shared by every directory user in tests.
pub const PASSWORD: &str = "correct horse battery staple";

/// 2023-11-14T22:13:20Z
pub const T0: i64 = 1_700_000_000_000;

/// Test application context
pub struct TestApp {
    /// The full edge: filter chain plus router
    pub router: Router,
    /// Clock driving session and rate-window expiry
    pub clock: Arc<ManualClock>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test edge over the in-memory cache tier.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test edge, adjusting the config first.
    pub async fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(customize, None).await
    }

    /// Create a test edge serving `routes` alongside the edge's own, behind
    /// the same filter chain.
    pub async fn with_routes(customize: impl FnOnce(&mut AppConfig), routes: Router) -> Self {
        Self::build(customize, Some(routes)).await
    }

    async fn build(customize: impl FnOnce(&mut AppConfig), routes: Option<Router>) -> Self {
        let mut config = test_config();
        customize(&mut config);

        let clock = Arc::new(ManualClock::new(T0));
        let cache = Arc::new(
            CacheManager::new(&config.cache, Arc::clone(&clock) as Arc<dyn Clock>)
                .await
                .expect("Failed to init cache"),
        );

        Self::assemble(config, cache, clock, routes)
    }

    /// Create a test edge whose cache tier refuses every call.
    pub fn with_cache_down() -> Self {
        let config = test_config();
        let clock = Arc::new(ManualClock::new(T0));
        let cache = Arc::new(CacheManager::from_provider(
            Arc::new(DownCache),
            Duration::from_millis(50),
        ));
        Self::assemble(config, cache, clock, None)
    }

    fn assemble(
        config: AppConfig,
        cache: Arc<CacheManager>,
        clock: Arc<ManualClock>,
        routes: Option<Router>,
    ) -> Self {
        config.validate().expect("Invalid test config");
        let state = AppState::new(
            config.clone(),
            cache,
            Arc::clone(&clock) as Arc<dyn Clock>,
        )
        .expect("Failed to build state");

        let router = match routes {
            Some(routes) => apply_filter_chain(state.clone(), build_router(state).merge(routes)),
            None => build_app(state),
        };

        Self {
            router,
            clock,
            config,
        }
    }

    /// Move the shared clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Login and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        self.send(req, body).await
    }

    /// Send a request built by the caller, with an optional JSON body.
    pub async fn send(&self, req: axum::http::request::Builder, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = req
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// A header value as a string, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `code` of a rejection body.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

/// Config with a memory cache, two directory users and role-gated routes.
///
/// `alice` holds role `admin` and permission `reports:read`; `bob` holds
/// nothing.
pub fn test_config() -> AppConfig {
    let hasher = PasswordHasher::with_params(1024, 1, 1).expect("Invalid argon2 params");
    let hash = hasher.hash_password(PASSWORD).expect("Failed to hash password");

    let mut config = AppConfig::default();
    config.auth.signing_key = "integration-test-signing-key-0123456789abcdef".to_string();
    config.auth.routes = vec![
        RouteRuleConfig {
            pattern: "/api/admin/*".to_string(),
            requires_auth: true,
            roles: vec!["admin".to_string(), "operator".to_string()],
            permissions: vec![],
            rate: None,
        },
        RouteRuleConfig {
            pattern: "/api/reports/*".to_string(),
            requires_auth: true,
            roles: vec![],
            permissions: vec!["reports:read".to_string(), "reports:write".to_string()],
            rate: None,
        },
    ];
    config.directory.users = vec![
        DirectoryUserConfig {
            user_id: "u-alice".to_string(),
            username: "alice".to_string(),
            password_hash: hash.clone(),
            roles: vec!["admin".to_string()],
            permissions: vec!["reports:read".to_string()],
        },
        DirectoryUserConfig {
            user_id: "u-bob".to_string(),
            username: "bob".to_string(),
            password_hash: hash,
            roles: vec![],
            permissions: vec![],
        },
    ];
    config
}

/// A cache tier that refuses every call.
#[derive(Debug)]
pub struct DownCache;

fn down<T>() -> AppResult<T> {
    Err(AppError::cache_unavailable("connection refused"))
}

#[async_trait]
impl CacheProvider for DownCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        down()
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        down()
    }
    async fn delete(&self, _key: &str) -> AppResult<()> {
        down()
    }
    async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<bool> {
        down()
    }
    async fn ttl(&self, _key: &str) -> AppResult<Option<Duration>> {
        down()
    }
    async fn zadd(&self, _key: &str, _member: &str, _score: i64) -> AppResult<()> {
        down()
    }
    async fn zadd_existing(&self, _key: &str, _member: &str, _score: i64) -> AppResult<bool> {
        down()
    }
    async fn zrem(&self, _key: &str, _member: &str) -> AppResult<bool> {
        down()
    }
    async fn zrange_by_score(&self, _key: &str, _min: i64, _max: i64) -> AppResult<Vec<String>> {
        down()
    }
    async fn zrem_range_by_score(&self, _key: &str, _min: i64, _max: i64) -> AppResult<u64> {
        down()
    }
    async fn admit_fixed_window(
        &self,
        _key: &str,
        _window: Duration,
        _limit: u64,
    ) -> AppResult<bool> {
        down()
    }
    async fn health_check(&self) -> AppResult<bool> {
        down()
    }
}

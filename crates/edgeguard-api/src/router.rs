//! Route definitions for the EdgeGuard HTTP API.
//!
//! The edge serves its own auth and health endpoints under `/api`; every
//! other path falls through to the upstream forwarder.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes and the upstream fallback.
///
/// The filter chain is applied by [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(session_routes())
        .merge(health_routes())
        .fallback(handlers::proxy::forward_or_not_found)
        .with_state(state)
}

/// Auth endpoints: login, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
}

/// The caller's own sessions
fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/auth/sessions",
            get(handlers::sessions::list_sessions).delete(handlers::sessions::revoke_all_sessions),
        )
        .route(
            "/api/auth/sessions/{session_id}",
            delete(handlers::sessions::revoke_session),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(handlers::health::health))
}

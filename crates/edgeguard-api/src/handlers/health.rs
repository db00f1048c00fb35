//! Health check handler.

use axum::Json;
use axum::extract::State;

use edgeguard_core::traits::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Always answers 200; an unreachable cache tier reports `degraded`.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let cache_ok = matches!(state.cache.health_check().await, Ok(true));

    Json(ApiResponse::ok(HealthResponse {
        status: if cache_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: if cache_ok { "connected" } else { "unavailable" }.to_string(),
    }))
}

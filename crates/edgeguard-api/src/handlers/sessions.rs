//! Self-service session management.

use axum::Json;
use axum::extract::{Path, State};

use edgeguard_core::error::AppError;
use uuid::Uuid;

use crate::dto::response::{ApiResponse, CountResponse, MessageResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, ApiError> {
    let sessions = state.session_manager.list_sessions(&auth.user_id).await?;
    let current = auth.session_id;

    Ok(Json(ApiResponse::ok(
        sessions
            .into_iter()
            .map(|s| SessionResponse::from_active(s, current))
            .collect(),
    )))
}

/// DELETE /api/auth/sessions/{session_id}
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let session_id = Uuid::parse_str(&session_id)
        .map_err(|_| AppError::validation(format!("Invalid session id: {session_id}")))?;

    state
        .session_manager
        .revoke_session(&auth.user_id, session_id)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: format!("Session {session_id} revoked"),
    })))
}

/// DELETE /api/auth/sessions
pub async fn revoke_all_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.session_manager.revoke_all(&auth.user_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

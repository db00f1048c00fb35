//! Auth handlers: login, logout, me.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, header};
use tracing::info;

use edgeguard_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, LoginResponse, MeResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientAddress, PropagatedIdentity};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientAddress,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let Json(req) =
        body.map_err(|e| AppError::validation(format!("Invalid login request: {}", e.body_text())))?;

    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::validation("username and password are required").into());
    }

    let user = state
        .directory
        .authenticate(req.username.trim(), &req.password)
        .await?
        .ok_or_else(|| AppError::invalid_credentials("Invalid username or password"))?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let issued = state
        .session_manager
        .login(&user, &client.0, user_agent)
        .await?;

    info!(
        user_id = %user.user_id,
        session_id = %issued.descriptor.session_id,
        client = %client.0,
        "User logged in"
    );

    Ok(Json(ApiResponse::ok(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        session_id: issued.descriptor.session_id,
        expires_at: issued.expires_at,
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.session_manager.logout(&auth).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// GET /api/auth/me
///
/// Answers from the propagated identity headers, exactly as a service behind
/// the edge would.
pub async fn me(identity: PropagatedIdentity) -> Json<ApiResponse<MeResponse>> {
    let identity = identity.0;
    Json(ApiResponse::ok(MeResponse {
        user_id: identity.user_id,
        username: identity.username,
        session_id: identity.session_id,
    }))
}

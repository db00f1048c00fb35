//! Fallback for routes the edge does not serve itself.

use axum::extract::{Request, State};
use axum::response::Response;

use edgeguard_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Forward upstream when one is configured; otherwise a normalized 404.
pub async fn forward_or_not_found(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    match &state.upstream {
        Some(upstream) => Ok(upstream.forward(request).await?),
        None => Err(AppError::not_found(format!("No route for {}", request.uri().path())).into()),
    }
}

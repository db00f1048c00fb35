//! Authentication stage.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use edgeguard_auth::SessionDescriptor;
use edgeguard_auth::TokenError;
use edgeguard_auth::token::bearer_token;
use edgeguard_core::error::{AppError, ErrorKind};
use edgeguard_core::result::AppResult;

use crate::error::ApiError;
use crate::policy::RoutePolicy;
use crate::state::AppState;

/// Code reported when no `Authorization` header is present.
pub const NO_TOKEN: &str = "NO_TOKEN";

/// Rejects requests to protected routes that lack a live session.
///
/// Public routes pass straight through. On success the session descriptor
/// is attached to the request for the identity stage and handlers.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let policy = state.policies.resolve(request.uri().path());
    if !policy.requires_auth {
        return next.run(request).await;
    }

    match authorize(&state, policy, request.headers()).await {
        Ok(descriptor) => {
            request.extensions_mut().insert(descriptor);
            next.run(request).await
        }
        Err(err) => {
            let code = err.code();
            metrics::counter!("auth_rejections_total", "code" => code.clone()).increment(1);
            match err.kind {
                ErrorKind::AccessDenied => warn!(code = %code, route = %policy.pattern, "Access denied"),
                _ => debug!(code = %code, route = %policy.pattern, "Authentication rejected"),
            }
            ApiError(err).into_response()
        }
    }
}

async fn authorize(
    state: &AppState,
    policy: &RoutePolicy,
    headers: &HeaderMap,
) -> AppResult<SessionDescriptor> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| {
            AppError::missing_credentials("Missing Authorization header").with_code(NO_TOKEN)
        })?
        .to_str()
        .map_err(|_| TokenError::MalformedToken)?;
    let token = bearer_token(value)?;

    let validated = state.session_manager.validate(token).await?;
    let descriptor = validated.descriptor;

    if policy.needs_access_decision()
        && !state
            .access_decider
            .authorize(
                &descriptor.user_id,
                &policy.required_roles,
                &policy.required_permissions,
            )
            .await?
    {
        return Err(AppError::access_denied(
            "Insufficient role or permission for this route",
        ));
    }

    Ok(descriptor)
}

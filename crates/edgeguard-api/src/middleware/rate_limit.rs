//! Rate admission stage.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use edgeguard_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::ClientAddress;
use crate::state::AppState;

/// Sheds load before authentication.
///
/// The budget is keyed by client address and matched route pattern. Denials
/// carry `Retry-After`. Cache failures admit the request.
pub async fn admit_request(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let client = client_address(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
        state.config.server.trust_forwarded_for,
    );
    request
        .extensions_mut()
        .insert(ClientAddress(client.clone()));

    let policy = state.policies.resolve(request.uri().path());
    if state
        .rate_admission
        .check(&client, &policy.pattern, policy.rate)
        .await
    {
        return next.run(request).await;
    }

    metrics::counter!("rate_limit_denied_total", "route" => policy.pattern.clone()).increment(1);
    warn!(client = %client, route = %policy.pattern, "Rate limit exceeded");

    let mut response = ApiError(AppError::rate_limited("Too many requests")).into_response();
    response.headers_mut().insert(
        header::RETRY_AFTER,
        HeaderValue::from(state.rate_admission.retry_after_secs()),
    );
    response
}

/// Resolve the client address used as the rate key.
///
/// Forwarding headers are honoured only when the edge sits behind a trusted
/// proxy; otherwise the socket peer is used.
pub fn client_address(
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
    trust_forwarded_for: bool,
) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded.or(real_ip) {
            return ip.to_string();
        }
    }

    peer.map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

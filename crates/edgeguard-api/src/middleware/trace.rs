//! Trace id assignment and rejection normalization.

use axum::Json;
use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::error::Rejection;

/// Correlation header accepted from clients and echoed on every response.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

const MAX_TRACE_ID_LEN: usize = 128;

/// Request-scoped correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    /// Accept a client-supplied id, or mint a fresh one.
    ///
    /// Inbound ids are limited to 128 visible characters from
    /// `[A-Za-z0-9._:-]` so they are safe to log and echo.
    pub fn from_inbound(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|v| v.to_str().ok())
            .filter(|id| is_acceptable(id))
            .map(|id| Self(id.to_string()))
            .unwrap_or_else(|| Self(Uuid::new_v4().to_string()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_TRACE_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'))
}

/// Outermost stage.
///
/// Assigns the trace id, runs the rest of the chain inside a span carrying
/// it, echoes it in `X-Trace-Id`, and completes any rejection body with the
/// request path and trace id. The span lives only for this future, so the
/// logging context is released on every exit path.
pub async fn assign_trace_id(mut request: Request, next: Next) -> Response {
    let trace_id = TraceId::from_inbound(request.headers().get(TRACE_ID_HEADER));
    let path = request.uri().path().to_string();

    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        request.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    request.extensions_mut().insert(trace_id.clone());

    let span = info_span!(
        "request",
        trace_id = %trace_id.as_str(),
        method = %request.method(),
        path = %path,
    );

    let mut response = next.run(request).instrument(span).await;

    if let Some(rejection) = response.extensions_mut().remove::<Rejection>() {
        let status = response.status();
        let mut normalized =
            (status, Json(rejection.body(&path, trace_id.as_str()))).into_response();
        for (name, value) in response.headers() {
            if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
                normalized.headers_mut().insert(name.clone(), value.clone());
            }
        }
        response = normalized;
    }

    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

//! Maps domain `AppError` to normalized HTTP rejections.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use edgeguard_auth::TokenError;
use edgeguard_core::error::{AppError, ErrorKind};

/// Body of every rejection the edge produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionBody {
    /// Machine-readable reason.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Request path.
    pub path: String,
    /// Correlation id echoed from `X-Trace-Id`.
    pub trace_id: String,
}

/// Marker left on rejection responses so the trace stage can fill in
/// `path` and `traceId`.
#[derive(Debug, Clone)]
pub struct Rejection {
    /// Machine-readable reason.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Rejection {
    /// Render the full body for a request.
    pub fn body(&self, path: &str, trace_id: &str) -> RejectionBody {
        RejectionBody {
            code: self.code.clone(),
            message: self.message.clone(),
            path: path.to_string(),
            trace_id: trace_id.to_string(),
        }
    }
}

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self(err.into())
    }
}

/// Status code for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MissingCredentials
        | ErrorKind::InvalidToken
        | ErrorKind::SessionNotFound
        | ErrorKind::SessionExpiredAbsolute
        | ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::CacheUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Configuration | ErrorKind::Serialization | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;

        let message = match err.kind {
            ErrorKind::CacheUnavailable => "Session service temporarily unavailable".to_string(),
            ErrorKind::UpstreamUnavailable => {
                tracing::warn!(error = %err, "Upstream unavailable");
                "Upstream service unavailable".to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %err, "Internal server error");
                "Internal server error".to_string()
            }
            _ => err.message.clone(),
        };

        let rejection = Rejection {
            code: err.code(),
            message,
        };

        let mut response = (status, Json(rejection.body("", ""))).into_response();
        response.extensions_mut().insert(rejection);
        response
    }
}

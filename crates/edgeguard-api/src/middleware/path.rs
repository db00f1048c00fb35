//! Request path canonical-form check.
//!
//! Route policy is resolved on the path exactly as received, while the
//! upstream client resolves dot segments before sending. Any path whose
//! meaning could change between those two readings is refused here, before
//! rate admission or policy lookup sees it.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use edgeguard_core::error::AppError;

use crate::error::ApiError;

/// Machine code for a refused path.
pub const INVALID_PATH: &str = "INVALID_PATH";

/// Refuse paths that are not in canonical form with a 400.
pub async fn reject_ambiguous_path(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if is_ambiguous(path) {
        warn!(path = %path, "Refusing non-canonical request path");
        let err = AppError::validation("Request path is not in canonical form")
            .with_code(INVALID_PATH);
        return ApiError(err).into_response();
    }
    next.run(request).await
}

/// Whether `path` carries a `.` or `..` segment (plain or percent-encoded),
/// an empty interior segment, a backslash, or an encoded `/` or `\`.
pub fn is_ambiguous(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return path != "*";
    };

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;

    segments.iter().enumerate().any(|(i, segment)| {
        if segment.is_empty() {
            // Only a trailing slash may leave an empty segment.
            return i != last;
        }
        let lowered = segment.to_ascii_lowercase();
        if lowered.contains('\\') || lowered.contains("%2f") || lowered.contains("%5c") {
            return true;
        }
        let decoded = lowered.replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

//! Identity propagation stage.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use edgeguard_auth::SessionDescriptor;

use crate::extractors::identity::{IDENTITY_HEADERS, Identity};

/// Strips client-supplied identity headers, then writes the edge's own.
///
/// Runs on every request, so a public route never sees a spoofed identity.
pub async fn propagate_identity(mut request: Request, next: Next) -> Response {
    for name in IDENTITY_HEADERS {
        request.headers_mut().remove(name);
    }

    let identity = request
        .extensions()
        .get::<SessionDescriptor>()
        .map(Identity::from);
    if let Some(identity) = identity {
        identity.write_headers(request.headers_mut());
        request.extensions_mut().insert(identity);
    }

    next.run(request).await
}

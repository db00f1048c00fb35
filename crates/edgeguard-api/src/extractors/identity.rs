//! Identity as propagated from the edge to downstream handlers.
//!
//! Services behind the edge read identity from these headers and never
//! re-validate the bearer token; the edge strips any client-supplied copies
//! before writing its own.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use edgeguard_auth::SessionDescriptor;
use edgeguard_core::error::AppError;

use crate::error::ApiError;

/// Downstream user id header.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Downstream username header.
pub const USERNAME_HEADER: &str = "x-username";
/// Downstream session id header.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Every header the edge owns.
pub const IDENTITY_HEADERS: [&str; 3] = [USER_ID_HEADER, USERNAME_HEADER, SESSION_ID_HEADER];

/// The caller identity the edge vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id from the directory, sent as `X-User-Id`.
    pub user_id: String,
    /// Login name, sent as `X-Username`.
    pub username: String,
    /// The session that authenticated this request, sent as `X-Session-Id`.
    pub session_id: Uuid,
}

impl From<&SessionDescriptor> for Identity {
    fn from(descriptor: &SessionDescriptor) -> Self {
        Self {
            user_id: descriptor.user_id.clone(),
            username: descriptor.username.clone(),
            session_id: descriptor.session_id,
        }
    }
}

impl Identity {
    /// Write the identity headers. Values that cannot be carried in a header
    /// are skipped, and the extractor then rejects the request downstream.
    pub fn write_headers(&self, headers: &mut HeaderMap) {
        let session_id = self.session_id.to_string();
        let values = [
            (USER_ID_HEADER, self.user_id.as_str()),
            (USERNAME_HEADER, self.username.as_str()),
            (SESSION_ID_HEADER, session_id.as_str()),
        ];
        for (name, value) in values {
            match HeaderValue::from_bytes(value.as_bytes()) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => tracing::warn!(header = name, "Identity value not representable as a header"),
            }
        }
    }

    /// Read the identity headers.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| String::from_utf8(v.as_bytes().to_vec()).ok())
                .filter(|v| !v.is_empty())
        };

        Some(Self {
            user_id: text(USER_ID_HEADER)?,
            username: text(USERNAME_HEADER)?,
            session_id: Uuid::parse_str(&text(SESSION_ID_HEADER)?).ok()?,
        })
    }
}

/// Extractor for services behind the edge.
#[derive(Debug, Clone)]
pub struct PropagatedIdentity(pub Identity);

impl std::ops::Deref for PropagatedIdentity {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for PropagatedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers)
            .map(PropagatedIdentity)
            .ok_or_else(|| ApiError(AppError::missing_credentials("No propagated identity")))
    }
}

//! `AuthUser` extractor: the session the auth stage accepted.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use edgeguard_auth::SessionDescriptor;
use edgeguard_core::error::AppError;

use crate::error::ApiError;
use crate::middleware::auth::NO_TOKEN;

/// The authenticated caller, available on routes that require a session.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionDescriptor);

impl std::ops::Deref for AuthUser {
    type Target = SessionDescriptor;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionDescriptor>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                ApiError(AppError::missing_credentials("Authentication required").with_code(NO_TOKEN))
            })
    }
}

/// Client address resolved by the rate stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ClientAddress>()
            .cloned()
            .unwrap_or_else(|| ClientAddress("unknown".to_string())))
    }
}

//! Token verification failures.

use thiserror::Error;

use edgeguard_core::error::{AppError, ErrorKind};

/// Why a presented token was refused. Always client-caused; never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The signature does not match the payload under our key.
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// The token is not a well-formed compact token for this issuer.
    #[error("Token is malformed")]
    MalformedToken,
    /// Wrong authorization scheme or signing algorithm.
    #[error("Unsupported authorization scheme")]
    UnsupportedScheme,
}

impl TokenError {
    /// Machine-readable reason reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::MalformedToken => "MALFORMED_TOKEN",
            TokenError::UnsupportedScheme => "UNSUPPORTED_SCHEME",
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::with_source(ErrorKind::InvalidToken, err.to_string(), err).with_code(err.code())
    }
}

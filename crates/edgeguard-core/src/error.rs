//! Unified application error types for EdgeGuard.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The HTTP layer decides status codes
//! from the [`ErrorKind`] alone.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No bearer token was presented on a protected route.
    MissingCredentials,
    /// The bearer token failed verification (signature, structure, scheme).
    InvalidToken,
    /// The token verified but no live session record backs it.
    SessionNotFound,
    /// The session passed its absolute lifetime ceiling and was revoked.
    SessionExpiredAbsolute,
    /// Login rejected by the user directory.
    InvalidCredentials,
    /// The authorization collaborator refused the request.
    AccessDenied,
    /// A rate limit was exceeded.
    RateLimited,
    /// The cache tier failed or did not answer in time.
    CacheUnavailable,
    /// The upstream service could not be reached.
    UpstreamUnavailable,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "MISSING_CREDENTIALS"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::SessionNotFound => write!(f, "SESSION_NOT_FOUND"),
            Self::SessionExpiredAbsolute => write!(f, "SESSION_EXPIRED_ABSOLUTE"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::AccessDenied => write!(f, "ACCESS_DENIED"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::CacheUnavailable => write!(f, "CACHE_UNAVAILABLE"),
            Self::UpstreamUnavailable => write!(f, "UPSTREAM_UNAVAILABLE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout EdgeGuard.
///
/// `code` is an optional finer-grained reason (for example the token
/// failure sub-kind) that overrides the kind's default machine code.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Machine-readable reason, when finer than the kind.
    pub code: Option<&'static str>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a finer-grained machine-readable reason.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// The machine-readable reason reported to clients.
    pub fn code(&self) -> String {
        match self.code {
            Some(code) => code.to_string(),
            None => self.kind.to_string(),
        }
    }

    /// Create a missing-credentials error.
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingCredentials, message)
    }

    /// Create a session-not-found error.
    pub fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionNotFound, message)
    }

    /// Create an absolute-expiry error.
    pub fn session_expired_absolute(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionExpiredAbsolute, message)
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create an access-denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Create a cache-unavailable error.
    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CacheUnavailable, message)
    }

    /// Create an upstream-unavailable error.
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            code: self.code,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod cache;
pub mod logging;
pub mod rate_limit;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, MetricsConfig, ServerConfig, UpstreamConfig};
pub use self::auth::{AuthConfig, DirectoryConfig, DirectoryUserConfig, RouteRuleConfig};
pub use self::cache::CacheConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::rate_limit::{RateLimitConfig, RatePolicyKind};
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Minimum signing key length in bytes (256 bits).
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token and public-path settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session expiry horizons.
    #[serde(default)]
    pub session: SessionConfig,
    /// Rate admission settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Optional upstream the edge forwards unmatched routes to.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Static user directory.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prometheus exporter settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `EDGEGUARD__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("EDGEGUARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.public_paths"),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints the server cannot start without.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(AppError::configuration(format!(
                "auth.signing_key must be at least {MIN_SIGNING_KEY_BYTES} bytes, got {}",
                self.auth.signing_key.len()
            )));
        }

        let patterns = self
            .auth
            .public_paths
            .iter()
            .chain(self.auth.routes.iter().map(|r| &r.pattern));
        for pattern in patterns {
            if !pattern.starts_with('/') {
                return Err(AppError::configuration(format!(
                    "Route pattern '{pattern}' must start with '/'"
                )));
            }
        }

        let session = &self.session;
        if session.sliding_window_seconds == 0 {
            return Err(AppError::configuration(
                "session.sliding_window_seconds must be positive",
            ));
        }
        if session.renewal_threshold_seconds >= session.sliding_window_seconds {
            return Err(AppError::configuration(
                "session.renewal_threshold_seconds must be below the sliding window",
            ));
        }
        if session.sliding_window_seconds > session.max_lifetime_seconds {
            return Err(AppError::configuration(
                "session.sliding_window_seconds must not exceed session.max_lifetime_seconds",
            ));
        }

        if self.rate_limit.window_seconds == 0 || self.rate_limit.max_requests == 0 {
            return Err(AppError::configuration(
                "rate_limit.window_seconds and rate_limit.max_requests must be positive",
            ));
        }
        if self.rate_limit.relaxed_multiplier == 0 {
            return Err(AppError::configuration(
                "rate_limit.relaxed_multiplier must be positive",
            ));
        }

        match self.cache.provider.as_str() {
            "memory" | "redis" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        }

        if self.cache.operation_timeout_ms == 0 {
            return Err(AppError::configuration(
                "cache.operation_timeout_ms must be positive",
            ));
        }

        Ok(())
    }
}

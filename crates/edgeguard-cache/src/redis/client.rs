//! Redis connection management.

use std::sync::Arc;

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::{info, warn};

use edgeguard_core::config::cache::RedisCacheConfig;
use edgeguard_core::error::{AppError, ErrorKind};
use edgeguard_core::result::AppResult;

/// Shared, reconnecting Redis connection plus the key namespace of this
/// deployment.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    key_prefix: Arc<str>,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Connect, giving up after `connect_timeout_ms`.
    ///
    /// Every edge instance sharing a Redis must use the same `key_prefix`,
    /// or they will not see each other's sessions and counters.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        let connect_timeout = config.connect_timeout();
        info!(url = %redact_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e)
        })?;

        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                AppError::cache_unavailable(format!(
                    "Redis did not accept a connection within {}ms",
                    connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                AppError::with_source(ErrorKind::CacheUnavailable, "Failed to connect to Redis", e)
            })?;

        if config.key_prefix.is_empty() {
            warn!("Redis key prefix is empty; keys share the database's global namespace");
        }

        info!("Connected to Redis");
        Ok(Self {
            conn,
            key_prefix: Arc::from(config.key_prefix.as_str()),
        })
    }

    /// A handle onto the multiplexed connection; cheap to clone per call.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Namespace a logical key.
    pub fn key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

/// Hide the password in a Redis URL for logging.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _password)) => format!("{scheme}://{user}:****@{host}"),
        None => url.to_string(),
    }
}

//! Cache manager that dispatches to the configured provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use edgeguard_core::config::cache::CacheConfig;
use edgeguard_core::error::{AppError, ErrorKind};
use edgeguard_core::result::AppResult;
use edgeguard_core::traits::cache::CacheProvider;
use edgeguard_core::traits::clock::Clock;

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
/// Every call is bounded by the operation timeout; an elapsed call surfaces
/// as [`ErrorKind::CacheUnavailable`], exactly like a backend failure, so
/// callers apply one failure policy to both.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
    /// Upper bound on a single call.
    timeout: Duration,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(
                    &config.memory,
                    clock,
                ))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self {
            inner,
            timeout: config.operation_timeout(),
        })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>, timeout: Duration) -> Self {
        Self {
            inner: provider,
            timeout,
        }
    }

    /// Run one cache call under the operation timeout.
    async fn bounded<T: Send>(
        &self,
        op: &'static str,
        call: impl Future<Output = AppResult<T>> + Send,
    ) -> AppResult<T> {
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::cache_unavailable(format!(
                "Cache operation '{op}' timed out after {}ms",
                self.timeout.as_millis()
            ))),
        };

        if let Err(e) = &result {
            if e.kind == ErrorKind::CacheUnavailable {
                error!(op, error = %e, "Cache tier unavailable");
            }
        }
        result
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.bounded("get", self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.bounded("set", self.inner.set(key, value, ttl)).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.bounded("delete", self.inner.delete(key)).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.bounded("expire", self.inner.expire(key, ttl)).await
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        self.bounded("ttl", self.inner.ttl(key)).await
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> AppResult<()> {
        self.bounded("zadd", self.inner.zadd(key, member, score))
            .await
    }

    async fn zadd_existing(&self, key: &str, member: &str, score: i64) -> AppResult<bool> {
        self.bounded("zadd_existing", self.inner.zadd_existing(key, member, score))
            .await
    }

    async fn zrem(&self, key: &str, member: &str) -> AppResult<bool> {
        self.bounded("zrem", self.inner.zrem(key, member)).await
    }

    async fn zrange_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<Vec<String>> {
        self.bounded("zrange_by_score", self.inner.zrange_by_score(key, min, max))
            .await
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<u64> {
        self.bounded(
            "zrem_range_by_score",
            self.inner.zrem_range_by_score(key, min, max),
        )
        .await
    }

    async fn admit_fixed_window(&self, key: &str, window: Duration, limit: u64) -> AppResult<bool> {
        self.bounded(
            "admit_fixed_window",
            self.inner.admit_fixed_window(key, window, limit),
        )
        .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.bounded("health_check", self.inner.health_check()).await
    }
}

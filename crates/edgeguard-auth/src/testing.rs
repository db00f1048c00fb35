//! Test doubles shared by unit tests in this crate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use edgeguard_cache::provider::CacheManager;
use edgeguard_core::error::AppError;
use edgeguard_core::result::AppResult;
use edgeguard_core::traits::CacheProvider;

/// A cache tier that refuses every call.
#[derive(Debug, Default)]
pub(crate) struct UnavailableCache;

impl UnavailableCache {
    pub(crate) fn manager() -> Arc<CacheManager> {
        Arc::new(CacheManager::from_provider(
            Arc::new(Self),
            Duration::from_millis(50),
        ))
    }
}

fn down<T>() -> AppResult<T> {
    Err(AppError::cache_unavailable("connection refused"))
}

#[async_trait]
impl CacheProvider for UnavailableCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        down()
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        down()
    }
    async fn delete(&self, _key: &str) -> AppResult<()> {
        down()
    }
    async fn expire(&self, _key: &str, _ttl: Duration) -> AppResult<bool> {
        down()
    }
    async fn ttl(&self, _key: &str) -> AppResult<Option<Duration>> {
        down()
    }
    async fn zadd(&self, _key: &str, _member: &str, _score: i64) -> AppResult<()> {
        down()
    }
    async fn zadd_existing(&self, _key: &str, _member: &str, _score: i64) -> AppResult<bool> {
        down()
    }
    async fn zrem(&self, _key: &str, _member: &str) -> AppResult<bool> {
        down()
    }
    async fn zrange_by_score(&self, _key: &str, _min: i64, _max: i64) -> AppResult<Vec<String>> {
        down()
    }
    async fn zrem_range_by_score(&self, _key: &str, _min: i64, _max: i64) -> AppResult<u64> {
        down()
    }
    async fn admit_fixed_window(
        &self,
        _key: &str,
        _window: Duration,
        _limit: u64,
    ) -> AppResult<bool> {
        down()
    }
    async fn health_check(&self) -> AppResult<bool> {
        down()
    }
}

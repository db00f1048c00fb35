//! Redis cache provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tracing::debug;

use edgeguard_core::error::{AppError, ErrorKind};
use edgeguard_core::result::AppResult;
use edgeguard_core::traits::cache::CacheProvider;

use super::client::RedisClient;
use super::scripts::FIXED_WINDOW_SCRIPT;

/// Redis-backed cache provider.
///
/// The admission script is hashed once here and sent by `EVALSHA`, falling
/// back to a full `EVAL` when Redis has not seen it (first use or after a
/// flush).
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
    fixed_window: Script,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            fixed_window: Script::new(FIXED_WINDOW_SCRIPT),
        }
    }

    /// Namespaced key and a connection handle for one call.
    fn target(&self, key: &str) -> (String, ConnectionManager) {
        (self.client.key(key), self.client.connection())
    }
}

fn unavailable(e: redis::RedisError) -> AppError {
    AppError::with_source(ErrorKind::CacheUnavailable, format!("Redis error: {e}"), e)
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let (key, mut conn) = self.target(key);
        conn.get(&key).await.map_err(unavailable)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let (key, mut conn) = self.target(key);
        let _: () = redis::cmd("SET")
            .arg(&key)
            .arg(value)
            .arg("PX")
            .arg(millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let (key, mut conn) = self.target(key);
        let _: () = conn.del(&key).await.map_err(unavailable)?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let (key, mut conn) = self.target(key);
        // PEXPIRE on a missing key is a no-op returning 0.
        let updated: i64 = redis::cmd("PEXPIRE")
            .arg(&key)
            .arg(millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(updated == 1)
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let (key, mut conn) = self.target(key);
        // -2: missing key, -1: no expiry
        let remaining: i64 = redis::cmd("PTTL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(u64::try_from(remaining).ok().map(Duration::from_millis))
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> AppResult<()> {
        let (key, mut conn) = self.target(key);
        let _: () = conn.zadd(&key, member, score).await.map_err(unavailable)?;
        Ok(())
    }

    async fn zadd_existing(&self, key: &str, member: &str, score: i64) -> AppResult<bool> {
        let (key, mut conn) = self.target(key);
        // MULTI/EXEC so the score read and the XX write see the same set.
        let (previous,): (Option<f64>,) = redis::pipe()
            .atomic()
            .cmd("ZSCORE")
            .arg(&key)
            .arg(member)
            .cmd("ZADD")
            .arg(&key)
            .arg("XX")
            .arg(score)
            .arg(member)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(previous.is_some())
    }

    async fn zrem(&self, key: &str, member: &str) -> AppResult<bool> {
        let (key, mut conn) = self.target(key);
        let removed: i64 = conn.zrem(&key, member).await.map_err(unavailable)?;
        Ok(removed > 0)
    }

    async fn zrange_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<Vec<String>> {
        let (key, mut conn) = self.target(key);
        conn.zrangebyscore(&key, min, max)
            .await
            .map_err(unavailable)
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<u64> {
        let (full_key, mut conn) = self.target(key);
        let removed: u64 = conn
            .zrembyscore(&full_key, min, max)
            .await
            .map_err(unavailable)?;
        if removed > 0 {
            debug!(key, removed, "Pruned sorted set by score");
        }
        Ok(removed)
    }

    async fn admit_fixed_window(&self, key: &str, window: Duration, limit: u64) -> AppResult<bool> {
        let (key, mut conn) = self.target(key);
        let admitted: i64 = self
            .fixed_window
            .key(&key)
            .arg(millis(window))
            .arg(limit)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(admitted == 1)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.connection();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(pong == "PONG")
    }
}

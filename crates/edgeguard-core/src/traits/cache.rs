//! Cache provider trait for pluggable caching backends.
//!
//! This is the complete cache-tier protocol the edge relies on: plain
//! key/value with TTL, sorted sets for the per-user session index, and one
//! atomic fixed-window admission primitive.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// All values are stored as strings (JSON). The cache provider
/// is responsible for key prefixing and TTL enforcement.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Set the TTL on an existing key.
    ///
    /// Returns `false` when the key is absent. A missing key is never created,
    /// so a concurrent delete always wins over this call.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Remaining TTL of a key at millisecond precision.
    ///
    /// Returns `None` when the key is absent or carries no expiry.
    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>>;

    /// Add a member to a sorted set, or update its score.
    async fn zadd(&self, key: &str, member: &str, score: i64) -> AppResult<()>;

    /// Update the score of a member only if it is already in the set.
    ///
    /// Returns `true` if the member existed.
    async fn zadd_existing(&self, key: &str, member: &str, score: i64) -> AppResult<bool>;

    /// Remove a member from a sorted set. Returns `true` if it was present.
    async fn zrem(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Members whose score lies in `[min, max]`, ordered by ascending score.
    async fn zrange_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<Vec<String>>;

    /// Remove members whose score lies in `[min, max]`. Returns the removed count.
    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<u64>;

    /// Atomically test-and-increment a fixed-window counter.
    ///
    /// Absent counter: initialise to 1 with `window` as TTL and admit.
    /// Counter below `limit`: increment and admit. Otherwise deny without
    /// incrementing.
    async fn admit_fixed_window(&self, key: &str, window: Duration, limit: u64) -> AppResult<bool>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json, ttl).await
    }

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

//! Session record and per-user session index over the shared cache.
//!
//! Two expiry horizons live here on purpose. The record TTL answers "is this
//! session alive right now"; the index score answers "which sessions might a
//! user still have". They may briefly disagree; validation and enumeration
//! reap the difference lazily.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use edgeguard_cache::keys;
use edgeguard_cache::provider::CacheManager;
use edgeguard_core::config::SessionConfig;
use edgeguard_core::result::AppResult;
use edgeguard_core::traits::CacheProvider;

use crate::token::SessionDescriptor;

/// Persistence for session records and the user session index.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Shared cache tier.
    cache: Arc<CacheManager>,
    /// Absolute lifetime ceiling.
    max_lifetime: Duration,
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(cache: Arc<CacheManager>, config: &SessionConfig) -> Self {
        Self {
            cache,
            max_lifetime: config.max_lifetime(),
        }
    }

    /// Write the record and index it under the user.
    ///
    /// The index score is the absolute expiry instant, `login_time + max_lifetime`.
    pub async fn put(&self, descriptor: &SessionDescriptor, ttl: Duration) -> AppResult<()> {
        let record_key = keys::session_record(descriptor.session_id);
        let index_key = keys::user_sessions(&descriptor.user_id);
        let score = descriptor.login_time + self.max_lifetime.as_millis() as i64;

        self.cache.set_json(&record_key, descriptor, ttl).await?;
        self.cache
            .zadd(&index_key, &descriptor.session_id.to_string(), score)
            .await?;
        self.cache.expire(&index_key, self.max_lifetime).await?;

        debug!(
            user_id = %descriptor.user_id,
            session_id = %descriptor.session_id,
            "Session record stored"
        );
        Ok(())
    }

    /// Read a session record.
    pub async fn get(&self, session_id: Uuid) -> AppResult<Option<SessionDescriptor>> {
        self.cache.get_json(&keys::session_record(session_id)).await
    }

    /// Remaining record TTL, millisecond precision.
    pub async fn ttl(&self, session_id: Uuid) -> AppResult<Option<Duration>> {
        self.cache.ttl(&keys::session_record(session_id)).await
    }

    /// Reset the record TTL without changing its value.
    ///
    /// Returns `false` if the record is gone; a deleted session is never
    /// recreated.
    pub async fn touch(&self, session_id: Uuid, ttl: Duration) -> AppResult<bool> {
        self.cache
            .expire(&keys::session_record(session_id), ttl)
            .await
    }

    /// Move an indexed session's score forward, if it is still indexed.
    pub async fn bump_index(&self, user_id: &str, session_id: Uuid, score: i64) -> AppResult<bool> {
        let index_key = keys::user_sessions(user_id);
        let bumped = self
            .cache
            .zadd_existing(&index_key, &session_id.to_string(), score)
            .await?;
        if bumped {
            self.cache.expire(&index_key, self.max_lifetime).await?;
        }
        Ok(bumped)
    }

    /// Delete the record and drop it from the user index.
    pub async fn remove(&self, session_id: Uuid, user_id: &str) -> AppResult<()> {
        self.cache.delete(&keys::session_record(session_id)).await?;
        self.unindex(user_id, session_id).await?;
        Ok(())
    }

    /// Drop a session id from the user index only.
    pub async fn unindex(&self, user_id: &str, session_id: Uuid) -> AppResult<bool> {
        self.cache
            .zrem(&keys::user_sessions(user_id), &session_id.to_string())
            .await
    }

    /// Remove index members whose expiry score is at or before `now`.
    pub async fn prune_expired_index_entries(&self, user_id: &str, now: i64) -> AppResult<u64> {
        let removed = self
            .cache
            .zrem_range_by_score(&keys::user_sessions(user_id), i64::MIN, now)
            .await?;
        if removed > 0 {
            debug!(user_id, removed, "Pruned expired session index entries");
        }
        Ok(removed)
    }

    /// Session ids indexed for a user with an expiry score after `now`.
    pub async fn list_index(&self, user_id: &str, now: i64) -> AppResult<Vec<Uuid>> {
        let members = self
            .cache
            .zrange_by_score(&keys::user_sessions(user_id), now.saturating_add(1), i64::MAX)
            .await?;
        Ok(members
            .iter()
            .filter_map(|member| Uuid::parse_str(member).ok())
            .collect())
    }

    /// Delete every record indexed for the user, then the index itself.
    ///
    /// Returns the number of sessions that were indexed.
    pub async fn remove_all(&self, user_id: &str) -> AppResult<u64> {
        let index_key = keys::user_sessions(user_id);
        let members = self
            .cache
            .zrange_by_score(&index_key, i64::MIN, i64::MAX)
            .await?;

        for member in &members {
            if let Ok(session_id) = Uuid::parse_str(member) {
                self.cache.delete(&keys::session_record(session_id)).await?;
            }
        }
        self.cache.delete(&index_key).await?;
        Ok(members.len() as u64)
    }
}

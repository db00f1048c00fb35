//! In-memory cache implementation backed by `DashMap`.
//!
//! Entries carry an absolute expiry instant read from the injected clock, so
//! TTL reads and renewals behave like the Redis backend. Expired entries are
//! invisible to every operation and are dropped lazily. Compound operations
//! run under the entry's shard lock and are therefore atomic in-process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use edgeguard_core::config::cache::MemoryCacheConfig;
use edgeguard_core::error::AppError;
use edgeguard_core::result::AppResult;
use edgeguard_core::traits::cache::CacheProvider;
use edgeguard_core::traits::clock::Clock;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Sorted(HashMap<String, i64>),
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    /// Absolute expiry in clock millis; `None` never expires.
    expires_at: Option<i64>,
}

impl Slot {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory cache provider.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    entries: Arc<DashMap<String, Slot>>,
    clock: Arc<dyn Clock>,
    max_capacity: u64,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
            max_capacity: config.max_capacity,
        }
    }

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    fn deadline(&self, ttl: Duration) -> i64 {
        self.now() + ttl.as_millis() as i64
    }

    /// Drop the key if it has expired.
    fn purge_expired(&self, key: &str, now: i64) {
        self.entries.remove_if(key, |_, slot| !slot.is_live(now));
    }

    /// Refuse new keys once the store is full, after sweeping expired ones.
    fn ensure_capacity(&self, key: &str) -> AppResult<()> {
        if (self.entries.len() as u64) < self.max_capacity || self.entries.contains_key(key) {
            return Ok(());
        }
        let now = self.now();
        self.entries.retain(|_, slot| slot.is_live(now));
        if (self.entries.len() as u64) < self.max_capacity {
            return Ok(());
        }
        Err(AppError::cache_unavailable("In-memory cache is at capacity"))
    }

    fn remove_if_empty_set(&self, key: &str) {
        self.entries.remove_if(key, |_, slot| {
            matches!(&slot.value, Value::Sorted(members) if members.is_empty())
        });
    }

    fn wrong_type(key: &str) -> AppError {
        AppError::internal(format!("Key '{key}' holds the wrong kind of value"))
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = self.now();
        self.purge_expired(key, now);
        match self.entries.get(key) {
            Some(slot) => match &slot.value {
                Value::Str(value) => Ok(Some(value.clone())),
                Value::Sorted(_) => Err(Self::wrong_type(key)),
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.ensure_capacity(key)?;
        self.entries.insert(
            key.to_string(),
            Slot {
                value: Value::Str(value.to_string()),
                expires_at: Some(self.deadline(ttl)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let now = self.now();
        self.purge_expired(key, now);
        match self.entries.get_mut(key) {
            Some(mut slot) => {
                slot.expires_at = Some(now + ttl.as_millis() as i64);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let now = self.now();
        self.purge_expired(key, now);
        Ok(self
            .entries
            .get(key)
            .and_then(|slot| slot.expires_at)
            .map(|at| Duration::from_millis((at - now).max(0) as u64)))
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> AppResult<()> {
        let now = self.now();
        self.purge_expired(key, now);
        self.ensure_capacity(key)?;
        let mut slot = self.entries.entry(key.to_string()).or_insert_with(|| Slot {
            value: Value::Sorted(HashMap::new()),
            expires_at: None,
        });
        match &mut slot.value {
            Value::Sorted(members) => {
                members.insert(member.to_string(), score);
                Ok(())
            }
            Value::Str(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn zadd_existing(&self, key: &str, member: &str, score: i64) -> AppResult<bool> {
        let now = self.now();
        self.purge_expired(key, now);
        let Some(mut slot) = self.entries.get_mut(key) else {
            return Ok(false);
        };
        match &mut slot.value {
            Value::Sorted(members) => match members.get_mut(member) {
                Some(current) => {
                    *current = score;
                    Ok(true)
                }
                None => Ok(false),
            },
            Value::Str(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn zrem(&self, key: &str, member: &str) -> AppResult<bool> {
        let now = self.now();
        self.purge_expired(key, now);
        let removed = match self.entries.get_mut(key) {
            Some(mut slot) => match &mut slot.value {
                Value::Sorted(members) => members.remove(member).is_some(),
                Value::Str(_) => return Err(Self::wrong_type(key)),
            },
            None => false,
        };
        self.remove_if_empty_set(key);
        Ok(removed)
    }

    async fn zrange_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<Vec<String>> {
        let now = self.now();
        self.purge_expired(key, now);
        let Some(slot) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        let Value::Sorted(members) = &slot.value else {
            return Err(Self::wrong_type(key));
        };
        let mut in_range: Vec<(&String, i64)> = members
            .iter()
            .filter(|(_, score)| (min..=max).contains(*score))
            .map(|(member, score)| (member, *score))
            .collect();
        in_range.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        Ok(in_range.into_iter().map(|(m, _)| m.clone()).collect())
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> AppResult<u64> {
        let now = self.now();
        self.purge_expired(key, now);
        let removed = match self.entries.get_mut(key) {
            Some(mut slot) => match &mut slot.value {
                Value::Sorted(members) => {
                    let before = members.len();
                    members.retain(|_, score| !(min..=max).contains(&*score));
                    (before - members.len()) as u64
                }
                Value::Str(_) => return Err(Self::wrong_type(key)),
            },
            None => 0,
        };
        self.remove_if_empty_set(key);
        Ok(removed)
    }

    async fn admit_fixed_window(&self, key: &str, window: Duration, limit: u64) -> AppResult<bool> {
        let now = self.now();
        self.ensure_capacity(key)?;
        let fresh = Slot {
            value: Value::Str("1".to_string()),
            expires_at: Some(now + window.as_millis() as i64),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().is_live(now) => {
                let Value::Str(raw) = &mut occupied.get_mut().value else {
                    return Err(Self::wrong_type(key));
                };
                let count: u64 = raw
                    .parse()
                    .map_err(|_| AppError::internal(format!("Counter '{key}' is not an integer")))?;
                if count < limit {
                    *raw = (count + 1).to_string();
                    Ok(true)
                } else {
                    debug!(key, count, limit, "Fixed window exhausted");
                    Ok(false)
                }
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(fresh);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Ok(true)
            }
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

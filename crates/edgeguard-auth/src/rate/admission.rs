//! Rate admission.
//!
//! The counter check and increment happen as one atomic step inside the
//! cache tier, so every edge instance shares one exact budget per key.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use edgeguard_cache::keys;
use edgeguard_cache::provider::CacheManager;
use edgeguard_core::config::{RateLimitConfig, RatePolicyKind};
use edgeguard_core::traits::CacheProvider;

/// Fixed-window admission keyed by client and route.
#[derive(Debug, Clone)]
pub struct RateAdmission {
    /// Shared cache tier.
    cache: Arc<CacheManager>,
    /// Window and caps.
    config: RateLimitConfig,
}

impl RateAdmission {
    /// Creates a new rate admission checker.
    pub fn new(cache: Arc<CacheManager>, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }

    /// Admit or deny one request against `key`.
    ///
    /// Fails open: if the cache tier errors or times out the request is
    /// admitted and the failure is logged.
    pub async fn admit(&self, key: &str, window: Duration, limit: u64) -> bool {
        match self.cache.admit_fixed_window(key, window, limit).await {
            Ok(admitted) => admitted,
            Err(e) => {
                error!(key, error = %e, "Rate admission unavailable; admitting request");
                metrics::counter!("rate_limit_fail_open_total").increment(1);
                true
            }
        }
    }

    /// Admit a request from `client` to `route` under the given policy.
    pub async fn check(&self, client: &str, route: &str, policy: RatePolicyKind) -> bool {
        let Some(limit) = self.limit_for(policy) else {
            return true;
        };

        let key = keys::rate_counter(client, route);
        let admitted = self.admit(&key, self.config.window(), limit).await;
        if !admitted {
            debug!(client, route, limit, "Rate limit exceeded");
        }
        admitted
    }

    /// Request cap for a policy, or `None` when no check applies.
    pub fn limit_for(&self, policy: RatePolicyKind) -> Option<u64> {
        if !self.config.enabled {
            return None;
        }
        match policy {
            RatePolicyKind::Standard => Some(self.config.max_requests),
            RatePolicyKind::Relaxed => Some(
                self.config
                    .max_requests
                    .saturating_mul(self.config.relaxed_multiplier),
            ),
            RatePolicyKind::Bypass => None,
        }
    }

    /// Seconds a denied client should wait, for `Retry-After`.
    pub fn retry_after_secs(&self) -> u64 {
        self.config.window_seconds
    }
}

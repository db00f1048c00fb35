//! Session expiry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The two expiry horizons of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle TTL of the session record, reset on renewal.
    #[serde(default = "default_sliding_window")]
    pub sliding_window_seconds: u64,
    /// Renew when the remaining record TTL drops below this.
    #[serde(default = "default_renewal_threshold")]
    pub renewal_threshold_seconds: u64,
    /// Absolute ceiling on session age, counted from login.
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: u64,
}

impl SessionConfig {
    /// Sliding window as a `Duration`.
    pub fn sliding_window(&self) -> Duration {
        Duration::from_secs(self.sliding_window_seconds)
    }

    /// Renewal threshold as a `Duration`.
    pub fn renewal_threshold(&self) -> Duration {
        Duration::from_secs(self.renewal_threshold_seconds)
    }

    /// Absolute lifetime as a `Duration`.
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sliding_window_seconds: default_sliding_window(),
            renewal_threshold_seconds: default_renewal_threshold(),
            max_lifetime_seconds: default_max_lifetime(),
        }
    }
}

fn default_sliding_window() -> u64 {
    3600
}

fn default_renewal_threshold() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    7 * 24 * 3600
}

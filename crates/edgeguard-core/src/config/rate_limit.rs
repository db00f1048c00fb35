//! Rate admission configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed-window rate admission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Master switch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Requests admitted per client and route per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
    /// Policy applied to public routes.
    #[serde(default)]
    pub public_policy: RatePolicyKind,
    /// Cap multiplier for the relaxed policy.
    #[serde(default = "default_relaxed_multiplier")]
    pub relaxed_multiplier: u64,
}

impl RateLimitConfig {
    /// Window length as a `Duration`.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: default_window(),
            max_requests: default_max_requests(),
            public_policy: RatePolicyKind::default(),
            relaxed_multiplier: default_relaxed_multiplier(),
        }
    }
}

/// How strictly a route is rate limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicyKind {
    /// The configured cap.
    Standard,
    /// The configured cap times `relaxed_multiplier`.
    #[default]
    Relaxed,
    /// No admission check.
    Bypass,
}

impl std::fmt::Display for RatePolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatePolicyKind::Standard => write!(f, "standard"),
            RatePolicyKind::Relaxed => write!(f, "relaxed"),
            RatePolicyKind::Bypass => write!(f, "bypass"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_window() -> u64 {
    60
}

fn default_max_requests() -> u64 {
    100
}

fn default_relaxed_multiplier() -> u64 {
    5
}

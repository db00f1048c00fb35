//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Output encoding of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, with the current request span attached.
    #[default]
    Json,
    /// Multi-line human-readable output for local runs.
    Pretty,
}

/// Tracing subscriber settings. `RUST_LOG` overrides `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `edgeguard_auth=debug,info`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Include the emitting module path on each line.
    #[serde(default = "default_target")]
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            target: default_target(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_target() -> bool {
    true
}

//! Authentication configuration.

use serde::{Deserialize, Serialize};

use super::rate_limit::RatePolicyKind;

/// Token signing and public-route configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing key. Must be at least 32 bytes.
    #[serde(default)]
    pub signing_key: String,
    /// Issuer written into and required from every token.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Paths that skip authentication. A trailing `/*` matches a prefix.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
    /// Extra per-route requirements, merged over the built-in policy table.
    #[serde(default)]
    pub routes: Vec<RouteRuleConfig>,
}

/// One declared route policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRuleConfig {
    /// Exact path, or a prefix ending in `/*`.
    pub pattern: String,
    /// Whether a valid session is required.
    #[serde(default = "default_true")]
    pub requires_auth: bool,
    /// Any one of these roles admits the caller.
    #[serde(default)]
    pub roles: Vec<String>,
    /// The caller must hold all of these permissions.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Rate policy override; defaults by route visibility.
    #[serde(default)]
    pub rate: Option<RatePolicyKind>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            issuer: default_issuer(),
            public_paths: default_public_paths(),
            routes: Vec::new(),
        }
    }
}

/// Static user directory used at login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Known users.
    #[serde(default)]
    pub users: Vec<DirectoryUserConfig>,
}

/// A single directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUserConfig {
    /// Stable user identifier.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Argon2id PHC hash of the login secret.
    pub password_hash: String,
    /// Role names granted to the user.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Permission names granted to the user.
    #[serde(default)]
    pub permissions: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_issuer() -> String {
    "edgeguard".to_string()
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/api/health".to_string(),
        "/api/auth/login".to_string(),
        "/docs/*".to_string(),
    ]
}

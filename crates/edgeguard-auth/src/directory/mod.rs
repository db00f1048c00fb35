//! Collaborators consulted by the edge: who a user is, and what they may do.

pub mod password;
pub mod static_directory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use edgeguard_core::result::AppResult;

pub use password::PasswordHasher;
pub use static_directory::StaticDirectory;

/// A user as known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Stable user identifier.
    pub user_id: String,
    /// Login name.
    pub username: String,
}

/// Credential verification.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Check a username/password pair.
    ///
    /// Returns `Ok(None)` for unknown users and wrong passwords alike.
    async fn authenticate(&self, username: &str, password: &str)
    -> AppResult<Option<DirectoryUser>>;
}

/// Role and permission decisions for a route.
#[async_trait]
pub trait AccessDecider: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `user_id` satisfies the requirements.
    ///
    /// `roles` is any-of; `permissions` is all-of. Empty lists impose nothing.
    async fn authorize(
        &self,
        user_id: &str,
        roles: &[String],
        permissions: &[String],
    ) -> AppResult<bool>;
}

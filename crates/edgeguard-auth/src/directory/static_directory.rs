//! Directory and access decisions backed by configuration.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use edgeguard_core::config::{DirectoryConfig, DirectoryUserConfig};
use edgeguard_core::result::AppResult;

use super::password::PasswordHasher;
use super::{AccessDecider, DirectoryUser, UserDirectory};

/// In-process directory loaded from `[[directory.users]]`.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    /// Username → entry.
    by_username: HashMap<String, DirectoryUserConfig>,
    /// User id → username.
    by_user_id: HashMap<String, String>,
    hasher: PasswordHasher,
}

impl StaticDirectory {
    /// Build from configuration. Later duplicates of a username win.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let mut directory = Self::default();
        for user in &config.users {
            directory
                .by_user_id
                .insert(user.user_id.clone(), user.username.clone());
            if directory
                .by_username
                .insert(user.username.clone(), user.clone())
                .is_some()
            {
                warn!(username = %user.username, "Duplicate directory entry; keeping the last one");
            }
        }
        directory
    }

    /// Number of configured users.
    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    /// Whether no users are configured.
    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }

    fn entry_for_user_id(&self, user_id: &str) -> Option<&DirectoryUserConfig> {
        self.by_user_id
            .get(user_id)
            .and_then(|username| self.by_username.get(username))
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<DirectoryUser>> {
        let Some(entry) = self.by_username.get(username) else {
            debug!(username, "Unknown user");
            return Ok(None);
        };

        if !self.hasher.verify_password(password, &entry.password_hash)? {
            debug!(username, "Password mismatch");
            return Ok(None);
        }

        Ok(Some(DirectoryUser {
            user_id: entry.user_id.clone(),
            username: entry.username.clone(),
        }))
    }
}

#[async_trait]
impl AccessDecider for StaticDirectory {
    async fn authorize(
        &self,
        user_id: &str,
        roles: &[String],
        permissions: &[String],
    ) -> AppResult<bool> {
        let Some(entry) = self.entry_for_user_id(user_id) else {
            return Ok(roles.is_empty() && permissions.is_empty());
        };

        let role_ok = roles.is_empty() || roles.iter().any(|r| entry.roles.contains(r));
        let permission_ok = permissions.iter().all(|p| entry.permissions.contains(p));
        Ok(role_ok && permission_ok)
    }
}

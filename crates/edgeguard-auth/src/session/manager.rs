//! Session lifecycle manager: login, validation with sliding renewal,
//! enumeration, and revocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use edgeguard_core::config::SessionConfig;
use edgeguard_core::error::AppError;
use edgeguard_core::traits::Clock;

use crate::directory::DirectoryUser;
use crate::token::{BrowserClass, DeviceClass, SessionDescriptor, TokenCodec};

use super::store::SessionStore;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Signed bearer token.
    pub token: String,
    /// The descriptor the token carries.
    pub descriptor: SessionDescriptor,
    /// Absolute expiry ceiling of the session.
    pub expires_at: DateTime<Utc>,
}

/// Outcome of an accepted validation.
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    /// Caller identity, as decoded from the token.
    pub descriptor: SessionDescriptor,
    /// Whether this request reset the sliding window.
    pub renewed: bool,
}

/// A live session as seen by enumeration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActiveSession {
    /// The stored descriptor.
    #[serde(flatten)]
    pub descriptor: SessionDescriptor,
    /// Remaining idle time before the record lapses.
    pub idle_expires_in_ms: u64,
    /// Absolute ceiling.
    pub expires_at: DateTime<Utc>,
}

/// Validates tokens against the session store and applies sliding renewal.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Token signing and verification.
    codec: Arc<TokenCodec>,
    /// Session persistence.
    store: Arc<SessionStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Expiry horizons.
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            codec,
            store,
            clock,
            config,
        }
    }

    /// Mint a session for an authenticated directory user.
    pub async fn login(
        &self,
        user: &DirectoryUser,
        client_ip: &str,
        user_agent: Option<&str>,
    ) -> Result<IssuedSession, AppError> {
        let descriptor = SessionDescriptor {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            session_id: Uuid::new_v4(),
            client_ip: client_ip.to_string(),
            device_class: DeviceClass::from_user_agent(user_agent),
            browser_class: BrowserClass::from_user_agent(user_agent),
            login_time: self.clock.now_millis(),
        };

        self.store
            .put(&descriptor, self.config.sliding_window())
            .await?;
        let token = self.codec.issue(&descriptor)?;

        info!(
            user_id = %descriptor.user_id,
            session_id = %descriptor.session_id,
            device = ?descriptor.device_class,
            browser = ?descriptor.browser_class,
            "Session created"
        );

        Ok(IssuedSession {
            token,
            expires_at: self.absolute_expiry(&descriptor),
            descriptor,
        })
    }

    /// Validate a bearer token and renew its session when the idle TTL runs low.
    ///
    /// 1. Verify the token; failures reject before any cache call.
    /// 2. Prune the user's index of entries whose expiry score has passed.
    /// 3. Read the record; absence rejects and unindexes the session.
    /// 4. Past the absolute ceiling: revoke and reject.
    /// 5. Remaining TTL below the threshold: reset it to the full window and
    ///    bump the index score.
    ///
    /// Renewal is idempotent. Concurrent renewals all write the same TTL, and
    /// a renewal racing a logout finds the record gone and cannot recreate it.
    pub async fn validate(&self, token: &str) -> Result<ValidatedSession, AppError> {
        let descriptor = self.codec.verify(token)?;
        let session_id = descriptor.session_id;
        let user_id = descriptor.user_id.as_str();
        let now = self.clock.now_millis();

        self.store.prune_expired_index_entries(user_id, now).await?;

        let record = match self.store.get(session_id).await? {
            Some(record) if record.user_id == descriptor.user_id => record,
            _ => {
                self.store.unindex(user_id, session_id).await?;
                debug!(user_id, session_id = %session_id, "No live session record");
                return Err(AppError::session_not_found("Session not found or logged out"));
            }
        };

        let max_lifetime_ms = self.config.max_lifetime().as_millis() as i64;
        if now - record.login_time > max_lifetime_ms {
            self.store.remove(session_id, user_id).await?;
            warn!(
                user_id,
                session_id = %session_id,
                "Session passed its absolute lifetime; revoked"
            );
            return Err(AppError::session_expired_absolute(
                "Session exceeded its maximum lifetime",
            ));
        }

        let Some(remaining) = self.store.ttl(session_id).await? else {
            self.store.unindex(user_id, session_id).await?;
            return Err(AppError::session_not_found("Session not found or logged out"));
        };

        let mut renewed = false;
        if remaining < self.config.renewal_threshold() {
            let window = self.config.sliding_window();
            if !self.store.touch(session_id, window).await? {
                return Err(AppError::session_not_found("Session not found or logged out"));
            }
            self.store
                .bump_index(user_id, session_id, now + window.as_millis() as i64)
                .await?;
            renewed = true;
            metrics::counter!("session_renewals_total").increment(1);
            debug!(
                user_id,
                session_id = %session_id,
                remaining_ms = remaining.as_millis() as u64,
                "Session renewed"
            );
        }

        Ok(ValidatedSession {
            descriptor,
            renewed,
        })
    }

    /// End the given session.
    pub async fn logout(&self, descriptor: &SessionDescriptor) -> Result<(), AppError> {
        self.store
            .remove(descriptor.session_id, &descriptor.user_id)
            .await?;
        info!(
            user_id = %descriptor.user_id,
            session_id = %descriptor.session_id,
            "Session logged out"
        );
        Ok(())
    }

    /// Live sessions of a user, oldest expiry first.
    ///
    /// Index members without a live record are reaped along the way.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<ActiveSession>, AppError> {
        let now = self.clock.now_millis();
        self.store.prune_expired_index_entries(user_id, now).await?;

        let mut sessions = Vec::new();
        for session_id in self.store.list_index(user_id, now).await? {
            let record = self.store.get(session_id).await?;
            let remaining = self.store.ttl(session_id).await?;
            match (record, remaining) {
                (Some(descriptor), Some(remaining)) if descriptor.user_id == user_id => {
                    sessions.push(ActiveSession {
                        expires_at: self.absolute_expiry(&descriptor),
                        idle_expires_in_ms: remaining.as_millis() as u64,
                        descriptor,
                    });
                }
                _ => {
                    self.store.unindex(user_id, session_id).await?;
                }
            }
        }
        Ok(sessions)
    }

    /// Revoke one of the user's own sessions.
    pub async fn revoke_session(&self, user_id: &str, session_id: Uuid) -> Result<(), AppError> {
        match self.store.get(session_id).await? {
            Some(record) if record.user_id == user_id => {
                self.store.remove(session_id, user_id).await?;
                info!(user_id, session_id = %session_id, "Session revoked");
                Ok(())
            }
            _ => Err(AppError::not_found(format!("Session {session_id} not found"))),
        }
    }

    /// Revoke every session of the user. Returns how many were indexed.
    pub async fn revoke_all(&self, user_id: &str) -> Result<u64, AppError> {
        let count = self.store.remove_all(user_id).await?;
        info!(user_id, count, "All sessions revoked");
        Ok(count)
    }

    fn absolute_expiry(&self, descriptor: &SessionDescriptor) -> DateTime<Utc> {
        let ceiling = descriptor.login_time + self.config.max_lifetime().as_millis() as i64;
        DateTime::from_timestamp_millis(ceiling).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// The configured sliding window.
    pub fn sliding_window(&self) -> Duration {
        self.config.sliding_window()
    }
}

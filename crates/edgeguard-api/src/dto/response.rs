//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use edgeguard_auth::session::ActiveSession;
use edgeguard_auth::token::{BrowserClass, DeviceClass};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Session id the token is bound to.
    pub session_id: Uuid,
    /// Absolute expiry ceiling of the session.
    pub expires_at: DateTime<Utc>,
}

/// The caller as seen by services behind the edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// User id.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Current session id.
    pub session_id: Uuid,
}

/// One live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Session id.
    pub session_id: Uuid,
    /// Client address at login.
    pub client_ip: String,
    /// Device family.
    pub device_class: DeviceClass,
    /// Browser family.
    pub browser_class: BrowserClass,
    /// Login instant.
    pub login_time: DateTime<Utc>,
    /// Absolute expiry ceiling.
    pub expires_at: DateTime<Utc>,
    /// Seconds of inactivity left before the session lapses.
    pub idle_expires_in_seconds: u64,
    /// Whether this is the session making the request.
    pub current: bool,
}

impl SessionResponse {
    /// Build from a live session, flagging the caller's own.
    pub fn from_active(session: ActiveSession, current_session: Uuid) -> Self {
        let descriptor = session.descriptor;
        Self {
            session_id: descriptor.session_id,
            current: descriptor.session_id == current_session,
            client_ip: descriptor.client_ip,
            device_class: descriptor.device_class,
            browser_class: descriptor.browser_class,
            login_time: DateTime::from_timestamp_millis(descriptor.login_time).unwrap_or_default(),
            expires_at: session.expires_at,
            idle_expires_in_seconds: session.idle_expires_in_ms / 1000,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the cache tier is unreachable.
    pub status: String,
    /// Version.
    pub version: String,
    /// Cache tier status.
    pub cache: String,
}

//! Session descriptor carried in tokens and mirrored in the session record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity payload of one login.
///
/// `login_time` is fixed for the lifetime of the session and anchors the
/// absolute expiry ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Stable user identifier from the directory.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Unique per login, never reused.
    pub session_id: Uuid,
    /// Client address at login.
    pub client_ip: String,
    /// Coarse device family.
    pub device_class: DeviceClass,
    /// Coarse browser family.
    pub browser_class: BrowserClass,
    /// Login instant in epoch milliseconds.
    pub login_time: i64,
}

/// Device family derived from the `User-Agent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
    Bot,
    Unknown,
}

/// Browser family derived from the `User-Agent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserClass {
    Chrome,
    Edge,
    Firefox,
    Safari,
    Opera,
    Other,
}

impl DeviceClass {
    /// Classify a `User-Agent` value.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent.map(str::to_ascii_lowercase) else {
            return Self::Unknown;
        };

        if ["bot", "crawler", "spider"].iter().any(|m| ua.contains(m)) {
            Self::Bot
        } else if ua.contains("ipad")
            || ua.contains("tablet")
            || (ua.contains("android") && !ua.contains("mobile"))
        {
            Self::Tablet
        } else if ua.contains("mobi") || ua.contains("iphone") || ua.contains("android") {
            Self::Mobile
        } else if ["windows", "macintosh", "x11", "linux", "cros"]
            .iter()
            .any(|m| ua.contains(m))
        {
            Self::Desktop
        } else {
            Self::Unknown
        }
    }
}

impl BrowserClass {
    /// Classify a `User-Agent` value.
    ///
    /// Order matters: Edge and Opera also advertise `Chrome/`, and Chrome
    /// also advertises `Safari/`.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent.map(str::to_ascii_lowercase) else {
            return Self::Other;
        };

        if ua.contains("edg/") || ua.contains("edga/") || ua.contains("edgios/") {
            Self::Edge
        } else if ua.contains("opr/") || ua.contains("opera") {
            Self::Opera
        } else if ua.contains("firefox/") || ua.contains("fxios/") {
            Self::Firefox
        } else if ua.contains("chrome/") || ua.contains("crios/") {
            Self::Chrome
        } else if ua.contains("safari/") {
            Self::Safari
        } else {
            Self::Other
        }
    }
}

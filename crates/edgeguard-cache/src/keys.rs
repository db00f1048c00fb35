//! Cache key builders for all EdgeGuard cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. Backend-level prefixes
//! (for example the Redis `key_prefix`) are applied on top of these.

use uuid::Uuid;

// ── Session keys ───────────────────────────────────────────

/// Authoritative session record.
pub fn session_record(session_id: Uuid) -> String {
    format!("session:{session_id}")
}

/// Sorted-set index of a user's sessions, scored by expiry instant.
pub fn user_sessions(user_id: &str) -> String {
    format!("user-sessions:{user_id}")
}

// ── Rate keys ──────────────────────────────────────────────

/// Fixed-window counter for one client on one route.
pub fn rate_counter(client: &str, route: &str) -> String {
    format!("rate:{client}:{route}")
}

//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use edgeguard_auth::session::SessionStore;
use edgeguard_auth::{
    AccessDecider, RateAdmission, SessionManager, StaticDirectory, TokenCodec, UserDirectory,
};
use edgeguard_cache::provider::CacheManager;
use edgeguard_core::config::AppConfig;
use edgeguard_core::result::AppResult;
use edgeguard_core::traits::Clock;

use crate::policy::PolicyTable;
use crate::upstream::UpstreamForwarder;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Route policy table
    pub policies: Arc<PolicyTable>,

    // ── Infrastructure ───────────────────────────────────────
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// Upstream forwarder for unmatched routes, if configured
    pub upstream: Option<Arc<UpstreamForwarder>>,

    // ── Auth ─────────────────────────────────────────────────
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,
    /// Fixed-window rate admission
    pub rate_admission: Arc<RateAdmission>,
    /// Credential checks at login
    pub directory: Arc<dyn UserDirectory>,
    /// Role and permission decisions
    pub access_decider: Arc<dyn AccessDecider>,
}

impl AppState {
    /// Wire every component from configuration over an existing cache tier.
    pub fn new(config: AppConfig, cache: Arc<CacheManager>, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let codec = Arc::new(TokenCodec::new(&config.auth)?);
        let store = Arc::new(SessionStore::new(Arc::clone(&cache), &config.session));
        let session_manager = Arc::new(SessionManager::new(
            codec,
            store,
            clock,
            config.session.clone(),
        ));
        let rate_admission = Arc::new(RateAdmission::new(
            Arc::clone(&cache),
            config.rate_limit.clone(),
        ));

        let directory = Arc::new(StaticDirectory::from_config(&config.directory));
        if directory.is_empty() {
            tracing::warn!("Static directory has no users; every login will be rejected");
        }

        let policies = Arc::new(PolicyTable::from_config(&config.auth, &config.rate_limit));
        let upstream = UpstreamForwarder::from_config(&config.upstream)?.map(Arc::new);

        Ok(Self {
            config: Arc::new(config),
            policies,
            cache,
            upstream,
            session_manager,
            rate_admission,
            directory: Arc::clone(&directory) as Arc<dyn UserDirectory>,
            access_decider: directory,
        })
    }
}

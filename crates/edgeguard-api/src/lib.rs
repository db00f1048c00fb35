//! # edgeguard-api
//!
//! HTTP edge for EdgeGuard built on Axum.
//!
//! Every request passes one fixed filter chain before it reaches a handler
//! or the upstream forwarder:
//!
//! 1. trace id assignment and rejection normalization
//! 2. request metrics
//! 3. canonical path check
//! 4. rate admission
//! 5. authentication and route policy
//! 6. identity propagation
//!
//! Provides the auth and session endpoints, health, the upstream forwarder,
//! and the `PropagatedIdentity` extractor for services behind the edge.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod router;
pub mod state;
pub mod upstream;

pub use app::{apply_filter_chain, build_app};
pub use error::ApiError;
pub use state::AppState;

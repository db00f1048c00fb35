//! The edge filter chain.
//!
//! Order, outermost first: [`trace`], [`metrics`], panic recovery,
//! [`path`], [`rate_limit`], [`auth`], [`identity`]. [`cors`] optionally
//! wraps the whole chain. See [`crate::app::apply_filter_chain`].

pub mod auth;
pub mod cors;
pub mod identity;
pub mod metrics;
pub mod path;
pub mod rate_limit;
pub mod trace;

//! # edgeguard-cache
//!
//! Cache provider implementations for EdgeGuard. Supports two modes:
//!
//! - **memory**: In-process store with per-entry expiry, for single-node use and tests
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate,
//!   shared by every edge instance
//!
//! The provider is selected at runtime based on configuration and every call
//! is bounded by the configured operation timeout.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;

//! # edgeguard-core
//!
//! Core crate for EdgeGuard. Contains configuration schemas, the cache-tier
//! protocol trait, the clock abstraction, and the unified error system.
//!
//! This crate has **no** internal dependencies on other EdgeGuard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

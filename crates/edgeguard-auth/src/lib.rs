//! # edgeguard-auth
//!
//! Session-backed bearer authentication and rate admission for the
//! EdgeGuard edge.
//!
//! ## Modules
//!
//! - `token`: signed session tokens with no embedded expiry
//! - `session`: session record + per-user index store, and the validation /
//!   sliding-renewal manager with its absolute lifetime ceiling
//! - `rate`: fixed-window rate admission evaluated inside the cache tier
//! - `directory`: collaborator interfaces for credential checks and
//!   role/permission decisions, plus a static implementation

pub mod directory;
pub mod rate;
pub mod session;
pub mod token;

#[cfg(test)]
mod testing;

pub use directory::{AccessDecider, DirectoryUser, PasswordHasher, StaticDirectory, UserDirectory};
pub use rate::RateAdmission;
pub use session::{SessionManager, SessionStore};
pub use token::{SessionDescriptor, TokenCodec, TokenError};

//! Custom Axum extractors.

pub mod auth;
pub mod identity;

pub use auth::{AuthUser, ClientAddress};
pub use identity::{Identity, PropagatedIdentity};

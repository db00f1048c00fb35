//! Session lifecycle: store, validation, sliding renewal, revocation.

pub mod manager;
pub mod store;

pub use manager::{ActiveSession, IssuedSession, SessionManager, ValidatedSession};
pub use store::SessionStore;

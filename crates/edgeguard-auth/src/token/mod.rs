//! Bearer token encoding and verification.

pub mod codec;
pub mod descriptor;
pub mod error;

pub use codec::{TokenCodec, bearer_token};
pub use descriptor::{BrowserClass, DeviceClass, SessionDescriptor};
pub use error::TokenError;

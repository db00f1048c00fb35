//! Convenience result alias used across all EdgeGuard crates.

use crate::error::AppError;

/// Standard result type for EdgeGuard operations.
pub type AppResult<T> = Result<T, AppError>;

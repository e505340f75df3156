//! Convenience result type alias for MediaNest.

use crate::error::AppError;

/// A specialized `Result` type for MediaNest operations.
pub type AppResult<T> = Result<T, AppError>;

//! Convenience result type alias for ReliefHub.

use crate::error::AppError;

/// A specialized `Result` type for ReliefHub operations.
pub type AppResult<T> = Result<T, AppError>;

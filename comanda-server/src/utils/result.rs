//! Unified Result Types

use super::AppError;

/// Application-level Result type, used in HTTP handlers and
/// application logic
pub type AppResult<T> = Result<T, AppError>;

//! Unified error handling
//!
//! Application-level error enum and the JSON error body every handler
//! returns through [`axum::response::IntoResponse`].
//!
//! Failure semantics: validation / not-found / conflict errors abort
//! before any write and surface here unmodified. Storage failures are
//! 5xx. Cache and broadcast failures never reach this type — they are
//! logged and swallowed inside the orders manager, because by then the
//! authoritative write has already committed.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// JSON body for error responses
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication (4xx) ==========
    /// Missing/unusable principal (401) — the auth middleware in front
    /// of this core normally guarantees one
    #[error("Authentication required")]
    Unauthorized,

    // ========== Business logic (4xx) ==========
    /// Resource absent (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Table occupancy conflict (400, matching the legacy surface)
    #[error("Table is already occupied: {0}")]
    TableOccupied(String),

    /// Bad input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    // ========== System (5xx) ==========
    /// Storage failure (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn table_occupied(msg: impl Into<String>) -> Self {
        AppError::TableOccupied(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TableOccupied(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<shared::models::InvalidEnumValue> for AppError {
    fn from(err: shared::models::InvalidEnumValue) -> Self {
        AppError::Validation(err.to_string())
    }
}

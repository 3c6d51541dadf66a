//! Repository Module
//!
//! Transactional access to the relational store. All monetary columns
//! are integer cents and all enum columns are wire-spelling text;
//! conversion to the domain types happens here and nowhere else.

pub mod dining_table;
pub mod order;
pub mod product;

pub use dining_table::DiningTableRepository;
pub use order::OrderStore;
pub use product::ProductRepository;

use crate::utils::AppError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Lost the table occupancy check-and-set inside the transaction
    #[error("Table is already occupied: {0}")]
    TableOccupied(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::TableOccupied(msg) => AppError::TableOccupied(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

//! Repository Module
//!
//! CRUD operations over the SQLite pool. Repositories are free async
//! functions taking `&SqlitePool` plus an explicit tenant (business) id;
//! no ambient tenant state anywhere below the HTTP layer.

pub mod business;
pub mod client;
pub mod coupon;
pub mod visit;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

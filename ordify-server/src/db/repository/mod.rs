//! Repository Module
//!
//! Free functions over the SQLite pool, one module per table. All queries
//! go through the runtime-checked API (`sqlx::query` / `sqlx::query_as`)
//! so the crate builds without a database at hand.

// Catalog
pub mod customer;
pub mod product;

// Contract domain (legal entities are created inside the agreement
// transaction and read through the detail JOIN)
pub mod agreement;

// Orders
pub mod order;

// Auth
pub mod token;
pub mod user;

// Reporting
pub mod statistics;

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
        // UNIQUE violations become Duplicate so callers can attach the
        // business message; everything else is a plain database error.
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

impl RepoError {
    /// Whether this error is a UNIQUE constraint violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RepoError::Duplicate(_))
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

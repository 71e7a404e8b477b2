//! Error types for the database client

use padelbook_common::StoreError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A stored value does not fit the domain model
    #[error("Database decode error: {0}")]
    DecodeError(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(_) | DbError::UrlError(_) | DbError::PoolError(_) => {
                StoreError::Unavailable(err.to_string())
            }
            DbError::SqlxError(sqlx::Error::PoolTimedOut)
            | DbError::SqlxError(sqlx::Error::PoolClosed)
            | DbError::SqlxError(sqlx::Error::Io(_)) => StoreError::Unavailable(err.to_string()),
            DbError::DecodeError(_) | DbError::SqlxError(sqlx::Error::ColumnDecode { .. }) => {
                StoreError::Decode(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

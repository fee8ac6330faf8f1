//! Storage-layer errors and their mapping onto the core error type.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use pocketwise_core::errors::{DatabaseError, Error};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Query failed: {0}")]
    Query(#[from] DieselError),

    #[error("Connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored column could not be converted back into its domain type.
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    #[error("Write actor unavailable: {0}")]
    WriterUnavailable(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db_error = match err {
            StorageError::Query(DieselError::DatabaseError(kind, info)) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => DatabaseError::UniqueViolation(message),
                    DatabaseErrorKind::ForeignKeyViolation => {
                        DatabaseError::ForeignKeyViolation(message)
                    }
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            StorageError::Query(e) => DatabaseError::QueryFailed(e.to_string()),
            StorageError::Connection(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::Pool(e) => DatabaseError::PoolError(e.to_string()),
            StorageError::Migration(message) => DatabaseError::MigrationFailed(message),
            StorageError::InvalidValue(message) | StorageError::WriterUnavailable(message) => {
                DatabaseError::Internal(message)
            }
        };
        Error::Database(db_error)
    }
}

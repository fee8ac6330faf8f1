//! Error types shared across the Pocketwise crates.

use thiserror::Error;

/// Result type alias used by the core services and traits.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the sync pipeline.
///
/// Crate-local errors (`LedgerError`, `AiError`, `StorageError`) convert into
/// this type at the crate boundary so the orchestrator can decide, per step,
/// whether a failure aborts the run or is only counted.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid caller identity. Checked before entering the core.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Aggregator or classifier unreachable, timed out, or answered non-200.
    #[error("Transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Malformed aggregator payload or unparseable classifier output.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Classifier answered with nothing usable.
    #[error("Classification ambiguous: {0}")]
    ClassificationAmbiguous(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures raised by the persistence gateway.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Pool error: {0}")]
    PoolError(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// HTTP status reported by an upstream service, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// True for failures of the relational store.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

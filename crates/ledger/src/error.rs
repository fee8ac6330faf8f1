//! Error types for the aggregator client.

use pocketwise_core::sync::{classify_http_status, RetryClass, RetryClassify};
use pocketwise_core::Error;
use thiserror::Error;

/// Result type alias for aggregator operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Connection, timeout or body transfer failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-200 answer; `message` carries the truncated raw body.
    #[error("Aggregator error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Payload did not match the expected account-set shape.
    #[error("Malformed aggregator payload: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl LedgerError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl RetryClassify for LedgerError {
    fn retry_class(&self) -> RetryClass {
        match self {
            Self::Api { status, .. } => classify_http_status(*status),
            Self::Http(e) if is_retryable_transport_error(e) => RetryClass::Retryable,
            Self::Http(_) | Self::Decode(_) | Self::InvalidRequest(_) => RetryClass::Permanent,
        }
    }
}

pub(crate) fn is_retryable_transport_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Decode(message) => Error::decode(message),
            LedgerError::InvalidRequest(message) => Error::Config(message),
            other => Error::transport(other.status_code(), other.to_string()),
        }
    }
}

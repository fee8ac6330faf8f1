use pocketwise_core::sync::{classify_http_status, RetryClass, RetryClassify};
use pocketwise_core::Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Classifier error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unreadable classifier response: {0}")]
    Decode(String),

    /// The service answered but offered no choice to read a label from.
    #[error("Classifier returned no answer")]
    EmptyAnswer,

    #[error("Classifier is not configured: {0}")]
    NotConfigured(String),
}

impl AiError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl RetryClassify for AiError {
    fn retry_class(&self) -> RetryClass {
        match self {
            Self::Api { status, .. } => classify_http_status(*status),
            Self::Http(e) if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() => {
                RetryClass::Retryable
            }
            _ => RetryClass::Permanent,
        }
    }
}

impl From<AiError> for Error {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Decode(message) => Error::decode(message),
            AiError::EmptyAnswer => {
                Error::ClassificationAmbiguous("classifier returned no answer".to_string())
            }
            AiError::NotConfigured(message) => Error::Config(message),
            other => Error::transport(other.status_code(), other.to_string()),
        }
    }
}

//! Transaction classifier backed by an OpenAI-compatible chat-completion API.

pub mod classifier;
pub mod error;
mod prompt;

pub use classifier::{ClassifierClient, ClassifierConfig};
pub use error::{AiError, Result};

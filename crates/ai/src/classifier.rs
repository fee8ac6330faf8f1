//! Chat-completion client that labels a transaction with one taxonomy category.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pocketwise_core::categories::TransactionClassifierTrait;
use pocketwise_core::sync::{retry_with_policy, truncate_body, RetryPolicy};

use crate::error::{AiError, Result};
use crate::prompt::{system_prompt, user_prompt};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_attempts: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: RetryPolicy::default().max_attempts,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ClassifierClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    system_prompt: String,
    retry: RetryPolicy,
}

impl ClassifierClient {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::NotConfigured("API key is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key,
            model: config.model,
            system_prompt: system_prompt(),
            retry: RetryPolicy::with_max_attempts(config.max_attempts),
        })
    }

    /// Raw label text for one transaction, before taxonomy normalization.
    pub async fn label(&self, description: &str, amount: &Decimal) -> Result<String> {
        let user = user_prompt(description, amount);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.0,
        };

        let body = self.post_with_retry(&request).await?;
        let response: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(
                "Failed to decode classifier response: {}. Body: {}",
                e,
                truncate_body(&body)
            );
            AiError::Decode(e.to_string())
        })?;

        let label = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyAnswer)?;
        debug!("Classifier labelled '{}' as '{}'", description, label.trim());
        Ok(label)
    }

    async fn post_with_retry(&self, request: &ChatCompletionRequest<'_>) -> Result<String> {
        retry_with_policy(&self.retry, "Classifier", || self.post_once(request)).await
    }

    async fn post_once(&self, request: &ChatCompletionRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::OK {
            return Ok(body);
        }
        let preview = truncate_body(&body);
        warn!("Classifier responded {}: {}", status, preview);
        Err(AiError::api(status.as_u16(), preview))
    }
}

#[async_trait]
impl TransactionClassifierTrait for ClassifierClient {
    async fn classify(
        &self,
        description: &str,
        amount: &Decimal,
    ) -> pocketwise_core::Result<String> {
        Ok(self.label(description, amount).await?)
    }
}

//! Retry classification and backoff shared by the outbound HTTP clients.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Longest upstream body excerpt kept in logs and error messages.
pub const MAX_LOG_BODY_CHARS: usize = 512;

/// Retry policy classification for upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryClass {
    Retryable,
    Permanent,
    ReauthRequired,
}

/// Classify HTTP status into retry behavior.
pub fn classify_http_status(status: u16) -> RetryClass {
    match status {
        401 | 403 => RetryClass::ReauthRequired,
        408 | 425 | 429 => RetryClass::Retryable,
        500..=599 => RetryClass::Retryable,
        _ => RetryClass::Permanent,
    }
}

/// Bounded retry budget for one outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retries.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Whether another attempt may follow attempt number `attempt` (1-based).
    pub fn allows_retry_after(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }

    /// Exponential backoff before the attempt following `attempt`, capped.
    pub fn backoff(&self, attempt: usize) -> Duration {
        const MAX_EXPONENT: u32 = 8;

        let exp = (attempt.saturating_sub(1) as u32).min(MAX_EXPONENT);
        let base_ms = self.base_delay.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1_u64 << exp);
        Duration::from_millis(delay_ms).min(self.max_delay)
    }
}

/// Errors from an outbound call that know whether they are worth retrying.
pub trait RetryClassify {
    fn retry_class(&self) -> RetryClass;
}

/// Cuts an upstream body down to [`MAX_LOG_BODY_CHARS`] characters.
pub fn truncate_body(body: &str) -> String {
    let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
    if body.chars().count() > MAX_LOG_BODY_CHARS {
        preview.push_str("...");
    }
    preview
}

/// [`RetryPolicy::backoff`] plus up to 20% random jitter.
pub fn backoff_with_jitter(policy: &RetryPolicy, attempt: usize) -> Duration {
    let backoff = policy.backoff(attempt).as_millis() as u64;
    let jitter = rand::thread_rng().gen_range(0..=(backoff / 5).max(1));
    Duration::from_millis(backoff.saturating_add(jitter))
}

/// Runs `attempt_once` until it succeeds, fails with a non-retryable error, or
/// the policy's attempt budget is spent. The last error is returned.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: &RetryPolicy,
    upstream: &str,
    mut attempt_once: F,
) -> std::result::Result<T, E>
where
    E: RetryClassify + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt = 0usize;

    loop {
        attempt = attempt.saturating_add(1);
        let error = match attempt_once().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if error.retry_class() == RetryClass::Retryable && policy.allows_retry_after(attempt) {
            let backoff = backoff_with_jitter(policy, attempt);
            debug!(
                "{} retry attempt {}/{} in {:?}: {}",
                upstream,
                attempt + 1,
                policy.max_attempts,
                backoff,
                error
            );
            tokio::time::sleep(backoff).await;
            continue;
        }
        return Err(error);
    }
}

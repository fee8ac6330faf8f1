//! HTTP client for the aggregator's account-set endpoint.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;

use pocketwise_core::ledger::{AccountSnapshot, LedgerClientTrait};
use pocketwise_core::sync::{retry_with_policy, truncate_body, RetryPolicy};

use crate::error::{LedgerError, Result};
use crate::types::AccountSet;

/// Default timeout for aggregator requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the aggregator.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Bridge root, e.g. `https://bridge.example/simplefin`; `/accounts` is appended.
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub max_attempts: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://beta-bridge.simplefin.org/simplefin".to_string(),
            username: String::new(),
            password: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: RetryPolicy::default().max_attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    retry: RetryPolicy,
}

impl LedgerClient {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(
                "aggregator base URL is empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
            retry: RetryPolicy::with_max_attempts(config.max_attempts),
        })
    }

    /// Accounts and transactions since `start_date`, optionally for one account.
    ///
    /// GET /accounts?start-date={epoch}[&account={id}]
    pub async fn get_accounts_since(
        &self,
        start_date: i64,
        account_id: Option<&str>,
    ) -> Result<Vec<AccountSnapshot>> {
        let mut query = vec![("start-date", start_date.to_string())];
        if let Some(account_id) = account_id {
            query.push(("account", account_id.to_string()));
        }
        self.get_account_set(&query).await
    }

    /// Every account visible to the configured credentials.
    ///
    /// GET /accounts
    pub async fn get_accounts(&self) -> Result<Vec<AccountSnapshot>> {
        self.get_account_set(&[]).await
    }

    async fn get_account_set(&self, query: &[(&str, String)]) -> Result<Vec<AccountSnapshot>> {
        let url = format!("{}/accounts", self.base_url);
        let body = self.get_with_retry(&url, query).await?;

        let set: AccountSet = serde_json::from_str(&body).map_err(|e| {
            warn!(
                "Failed to decode aggregator response: {}. Body: {}",
                e,
                truncate_body(&body)
            );
            LedgerError::decode(e.to_string())
        })?;

        for problem in &set.errors {
            warn!("Aggregator reported: {}", problem);
        }

        set.accounts
            .into_iter()
            .map(AccountSnapshot::try_from)
            .collect()
    }

    async fn get_with_retry(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        retry_with_policy(&self.retry, "Aggregator", || self.get_once(url, query)).await
    }

    /// One request; anything but 200 is an error, including a body that fails to arrive.
    async fn get_once(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::OK {
            debug!("Aggregator response status: {}", status);
            return Ok(body);
        }
        let preview = truncate_body(&body);
        warn!("Aggregator responded {}: {}", status, preview);
        Err(LedgerError::api(status.as_u16(), preview))
    }
}

#[async_trait]
impl LedgerClientTrait for LedgerClient {
    async fn fetch_since(
        &self,
        start_date: i64,
        account_id: Option<&str>,
    ) -> pocketwise_core::Result<Vec<AccountSnapshot>> {
        Ok(self.get_accounts_since(start_date, account_id).await?)
    }

    async fn fetch_accounts(&self) -> pocketwise_core::Result<Vec<AccountSnapshot>> {
        Ok(self.get_accounts().await?)
    }
}

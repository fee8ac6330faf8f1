//! Server configuration, read once at startup from the environment.

use std::time::Duration;

use pocketwise_ai::ClassifierConfig;
use pocketwise_core::sync::{RetryPolicy, DEFAULT_REFRESH_INTERVAL_SECS};
use pocketwise_core::{Error, Result};
use pocketwise_ledger::LedgerConfig;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_PATH: &str = "./data/pocketwise.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
    pub classifier: ClassifierConfig,
    /// `None` disables the background refresh.
    pub refresh_interval: Option<Duration>,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("{} must be set", key)))
        };

        let max_attempts = parse_or(
            "POCKETWISE_HTTP_MAX_ATTEMPTS",
            get("POCKETWISE_HTTP_MAX_ATTEMPTS"),
            RetryPolicy::default().max_attempts,
        )?;

        let ledger_defaults = LedgerConfig::default();
        let ledger = LedgerConfig {
            base_url: get("SIMPLEFIN_BASE_URL").unwrap_or(ledger_defaults.base_url),
            username: required("SIMPLEFIN_USERNAME")?,
            password: required("SIMPLEFIN_PASSWORD")?,
            timeout: parse_secs("SIMPLEFIN_TIMEOUT_SECS", get("SIMPLEFIN_TIMEOUT_SECS"))?
                .unwrap_or(ledger_defaults.timeout),
            max_attempts,
        };

        let classifier_defaults = ClassifierConfig::default();
        let classifier = ClassifierConfig {
            api_key: required("OPENAI_API_KEY")?,
            base_url: get("OPENAI_BASE_URL").unwrap_or(classifier_defaults.base_url),
            model: get("OPENAI_MODEL").unwrap_or(classifier_defaults.model),
            timeout: parse_secs("OPENAI_TIMEOUT_SECS", get("OPENAI_TIMEOUT_SECS"))?
                .unwrap_or(classifier_defaults.timeout),
            max_attempts,
        };

        let refresh_secs = parse_or(
            "POCKETWISE_REFRESH_INTERVAL_SECS",
            get("POCKETWISE_REFRESH_INTERVAL_SECS"),
            DEFAULT_REFRESH_INTERVAL_SECS,
        )?;

        Ok(Self {
            listen_addr: get("POCKETWISE_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            database: DatabaseConfig {
                path: get("POCKETWISE_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            },
            ledger,
            classifier,
            refresh_interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
            log_level: get("POCKETWISE_LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_json: parse_bool("POCKETWISE_LOG_JSON", get("POCKETWISE_LOG_JSON"))?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| Error::Config(format!("{} has an invalid value '{}'", key, value))),
        None => Ok(default),
    }
}

fn parse_secs(key: &str, raw: Option<String>) -> Result<Option<Duration>> {
    raw.map(|value| parse_or(key, Some(value), 0u64).map(Duration::from_secs))
        .transpose()
}

fn parse_bool(key: &str, raw: Option<String>) -> Result<bool> {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(Error::Config(format!(
            "{} has an invalid value '{}'",
            key, other
        ))),
    }
}

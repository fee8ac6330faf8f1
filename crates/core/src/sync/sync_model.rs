//! Sync scope, watermark derivation and run results.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::transactions::Transaction;

/// How far back the first fetch reaches when nothing is stored yet.
pub const WATERMARK_LOOKBACK_DAYS: i64 = 30;

/// Added to the newest stored `transacted_at` so the boundary record is not re-fetched.
pub const WATERMARK_BOUNDARY_OFFSET_SECS: i64 = 1;

/// Which accounts a sync run covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SyncScope {
    /// Every stored account, whoever owns it. Used by the scheduled refresh.
    AllAccounts,
    Account(String),
    /// The stored accounts of one user.
    Owner(String),
}

impl SyncScope {
    /// Account filter to send to the aggregator.
    pub fn account_id(&self) -> Option<&str> {
        match self {
            Self::Account(id) => Some(id.as_str()),
            Self::AllAccounts | Self::Owner(_) => None,
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        match self {
            Self::Owner(user_id) => Some(user_id.as_str()),
            Self::AllAccounts | Self::Account(_) => None,
        }
    }
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllAccounts => write!(f, "all accounts"),
            Self::Account(id) => write!(f, "account {}", id),
            Self::Owner(user_id) => write!(f, "accounts of user {}", user_id),
        }
    }
}

/// Lower fetch bound in seconds since epoch.
///
/// `latest` is the newest stored `transacted_at` within the scope:
/// `latest + 1` when something is stored, otherwise `now - 30 days`.
pub fn watermark_from(latest_transacted_at: Option<i64>, now: DateTime<Utc>) -> i64 {
    match latest_transacted_at {
        Some(latest) => latest.saturating_add(WATERMARK_BOUNDARY_OFFSET_SECS),
        None => (now - Duration::days(WATERMARK_LOOKBACK_DAYS)).timestamp(),
    }
}

/// Outcome of one sync run.
///
/// Partial progress is normal: counts tell the caller what landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub scope: SyncScope,
    pub watermark: i64,
    pub accounts_updated: usize,
    /// Returned by the aggregator but never discovered locally.
    pub accounts_skipped: usize,
    pub accounts_failed: usize,
    pub transactions_inserted: usize,
    /// Already stored; the dedup path.
    pub transactions_skipped: usize,
    pub transactions_failed: usize,
    pub classifier_calls: usize,
    pub duration_ms: i64,
    pub inserted: Vec<Transaction>,
}

impl SyncResult {
    pub fn new(scope: SyncScope, watermark: i64) -> Self {
        Self {
            scope,
            watermark,
            accounts_updated: 0,
            accounts_skipped: 0,
            accounts_failed: 0,
            transactions_inserted: 0,
            transactions_skipped: 0,
            transactions_failed: 0,
            classifier_calls: 0,
            duration_ms: 0,
            inserted: Vec::new(),
        }
    }

    /// True when some step failed but the run as a whole completed.
    pub fn is_partial(&self) -> bool {
        self.accounts_failed > 0 || self.transactions_failed > 0
    }
}

//! Aggregator-facing contract: what the sync pipeline needs from a ledger client.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;

/// One account as reported by the aggregator, with the transactions it
/// returned for the requested window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub balance: Decimal,
    pub available_balance: Decimal,
    pub balance_date: i64,
    pub org_name: String,
    pub transactions: Vec<TransactionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSnapshot {
    pub id: String,
    pub posted: i64,
    pub transacted_at: i64,
    pub amount: Decimal,
    pub description: String,
    pub payee: String,
    pub memo: String,
}

#[async_trait]
pub trait LedgerClientTrait: Send + Sync {
    /// Accounts and their transactions since `start_date` (seconds since epoch),
    /// optionally narrowed to one account.
    async fn fetch_since(
        &self,
        start_date: i64,
        account_id: Option<&str>,
    ) -> Result<Vec<AccountSnapshot>>;

    /// All accounts visible to the configured credentials, used by discovery.
    async fn fetch_accounts(&self) -> Result<Vec<AccountSnapshot>>;
}

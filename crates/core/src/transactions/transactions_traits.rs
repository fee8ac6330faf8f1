use async_trait::async_trait;
use chrono::Utc;

use super::transactions_model::{CategoryUpdate, InsertOutcome, Transaction};
use crate::errors::Result;
use crate::sync::{watermark_from, SyncScope};

/// Persistence contract for transactions.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Greatest `transacted_at` stored within `scope`.
    fn latest_transacted_at(&self, scope: &SyncScope) -> Result<Option<i64>>;

    fn transaction_exists(&self, transaction_id: &str) -> Result<bool>;

    /// Category of the most recent stored transaction with exactly this payee,
    /// ignoring rows without a category.
    fn find_category_by_payee(&self, payee: &str) -> Result<Option<String>>;

    fn list_transactions_for_account(&self, account_id: &str) -> Result<Vec<Transaction>>;

    fn list_transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Single-statement conditional insert keyed on the transaction id.
    async fn insert_transaction_if_absent(&self, transaction: Transaction)
        -> Result<InsertOutcome>;

    /// Applies category corrections. Returns the number of rows changed.
    async fn update_transaction_categories(&self, updates: Vec<CategoryUpdate>) -> Result<usize>;

    /// Lower time bound for the next aggregator fetch.
    fn get_watermark(&self, scope: &SyncScope) -> Result<i64> {
        let latest = self.latest_transacted_at(scope)?;
        Ok(watermark_from(latest, Utc::now()))
    }
}

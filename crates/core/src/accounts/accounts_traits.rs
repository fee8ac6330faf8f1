use async_trait::async_trait;

use super::accounts_model::{Account, AccountBalanceUpdate};
use crate::errors::Result;

/// Persistence contract for accounts.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    fn get_account(&self, account_id: &str) -> Result<Option<Account>>;

    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>>;

    /// Inserts the account or refreshes its descriptive and balance fields.
    async fn upsert_account(&self, account: Account) -> Result<Account>;

    /// Overwrites the balance triple. Returns `false` when no such account is stored.
    async fn update_account_balance(&self, update: AccountBalanceUpdate) -> Result<bool>;
}

use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::{exists, max};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use pocketwise_core::sync::SyncScope;
use pocketwise_core::transactions::{
    CategoryUpdate, InsertOutcome, Transaction, TransactionRepositoryTrait,
};
use pocketwise_core::Result;

use super::model::TransactionDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{accounts, transactions};

pub struct TransactionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        TransactionRepository { pool, writer }
    }

    fn to_domain(rows: Vec<TransactionDB>) -> Result<Vec<Transaction>> {
        rows.into_iter()
            .map(|row| Transaction::try_from(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn latest_transacted_at(&self, scope: &SyncScope) -> Result<Option<i64>> {
        let mut conn = get_connection(&self.pool)?;
        let latest = match scope {
            SyncScope::AllAccounts => transactions::table
                .select(max(transactions::transacted_at))
                .first::<Option<i64>>(&mut conn),
            SyncScope::Account(account) => transactions::table
                .filter(transactions::account_id.eq(account))
                .select(max(transactions::transacted_at))
                .first::<Option<i64>>(&mut conn),
            SyncScope::Owner(user_id) => transactions::table
                .inner_join(accounts::table)
                .filter(accounts::user_id.eq(user_id))
                .select(max(transactions::transacted_at))
                .first::<Option<i64>>(&mut conn),
        }
        .map_err(StorageError::from)?;
        Ok(latest)
    }

    fn transaction_exists(&self, transaction_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(exists(transactions::table.find(transaction_id)))
            .get_result::<bool>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(found)
    }

    fn find_category_by_payee(&self, payee: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let category = transactions::table
            .filter(transactions::payee.eq(payee))
            .filter(transactions::category.ne(""))
            .order(transactions::transacted_at.desc())
            .select(transactions::category)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(category)
    }

    fn list_transactions_for_account(&self, account_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::account_id.eq(account_id))
            .order(transactions::transacted_at.desc())
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Self::to_domain(rows)
    }

    fn list_transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .inner_join(accounts::table)
            .filter(accounts::user_id.eq(user_id))
            .order(transactions::transacted_at.desc())
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Self::to_domain(rows)
    }

    async fn insert_transaction_if_absent(
        &self,
        transaction: Transaction,
    ) -> Result<InsertOutcome> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InsertOutcome> {
                let row = TransactionDB::from(transaction);
                let inserted = diesel::insert_or_ignore_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(if inserted == 0 {
                    InsertOutcome::Duplicate
                } else {
                    InsertOutcome::Inserted
                })
            })
            .await
    }

    async fn update_transaction_categories(&self, updates: Vec<CategoryUpdate>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected_rows = 0;
                for update in updates {
                    affected_rows += diesel::update(transactions::table.find(&update.id))
                        .set(transactions::category.eq(&update.category))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected_rows)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountRepository;
    use crate::test_support::setup_db;
    use chrono::{Duration, Utc};
    use pocketwise_core::accounts::{Account, AccountRepositoryTrait};
    use rust_decimal_macros::dec;

    async fn seeded_repo() -> (tempfile::TempDir, TransactionRepository) {
        let (dir, pool, writer) = setup_db();
        let accounts = AccountRepository::new(pool.clone(), writer.clone());
        for (id, owner) in [("ACT-1", "user-1"), ("ACT-2", "user-1"), ("ACT-3", "user-2")] {
            accounts
                .upsert_account(Account {
                    id: id.to_string(),
                    user_id: owner.to_string(),
                    name: id.to_string(),
                    account_type: "General".to_string(),
                    currency: "USD".to_string(),
                    balance: dec!(0),
                    available_balance: dec!(0),
                    balance_date: 0,
                    org_name: "First Bank".to_string(),
                })
                .await
                .unwrap();
        }
        (dir, TransactionRepository::new(pool, writer))
    }

    fn txn(id: &str, account_id: &str, payee: &str, category: &str, at: i64) -> Transaction {
        Transaction {
            id: id.to_string(),
            account_id: account_id.to_string(),
            posted: at + 86_400,
            transacted_at: at,
            amount: dec!(-45.67),
            description: format!("POS {}", payee),
            payee: payee.to_string(),
            memo: String::new(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn empty_store_watermark_is_thirty_days_back() {
        let (_dir, repo) = seeded_repo().await;

        let expected = (Utc::now() - Duration::days(30)).timestamp();
        let watermark = repo.get_watermark(&SyncScope::AllAccounts).unwrap();

        assert!((watermark - expected).abs() <= 1, "watermark {watermark}");
    }

    #[tokio::test]
    async fn watermark_follows_latest_transaction() {
        let (_dir, repo) = seeded_repo().await;
        repo.insert_transaction_if_absent(txn("T1", "ACT-1", "Safeway", "Groceries", 1_700_000_000))
            .await
            .unwrap();
        repo.insert_transaction_if_absent(txn("T2", "ACT-2", "Safeway", "Groceries", 1_700_000_500))
            .await
            .unwrap();

        assert_eq!(
            repo.get_watermark(&SyncScope::AllAccounts).unwrap(),
            1_700_000_501
        );
        assert_eq!(
            repo.get_watermark(&SyncScope::Account("ACT-1".to_string()))
                .unwrap(),
            1_700_000_001
        );
    }

    #[tokio::test]
    async fn owner_watermark_ignores_other_owners() {
        let (_dir, repo) = seeded_repo().await;
        repo.insert_transaction_if_absent(txn("T1", "ACT-2", "Safeway", "Groceries", 1_700_000_000))
            .await
            .unwrap();
        repo.insert_transaction_if_absent(txn("T2", "ACT-3", "Safeway", "Groceries", 1_700_009_000))
            .await
            .unwrap();

        assert_eq!(
            repo.get_watermark(&SyncScope::Owner("user-1".to_string()))
                .unwrap(),
            1_700_000_001
        );
        assert_eq!(
            repo.get_watermark(&SyncScope::Owner("user-2".to_string()))
                .unwrap(),
            1_700_009_001
        );
        let expected = (Utc::now() - Duration::days(30)).timestamp();
        let unknown = repo
            .get_watermark(&SyncScope::Owner("user-3".to_string()))
            .unwrap();
        assert!((unknown - expected).abs() <= 1);
    }

    #[tokio::test]
    async fn duplicate_insert_is_ignored() {
        let (_dir, repo) = seeded_repo().await;
        let first = txn("T1", "ACT-1", "Olive Garden", "Food & Dining", 1_700_000_000);
        let mut replay = first.clone();
        replay.category = "Other".to_string();

        assert_eq!(
            repo.insert_transaction_if_absent(first).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            repo.insert_transaction_if_absent(replay).await.unwrap(),
            InsertOutcome::Duplicate
        );
        assert!(repo.transaction_exists("T1").unwrap());
        let stored = repo.list_transactions_for_account("ACT-1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].category, "Food & Dining");
        assert_eq!(stored[0].amount, dec!(-45.67));
    }

    #[tokio::test]
    async fn insert_for_unknown_account_fails() {
        let (_dir, repo) = seeded_repo().await;

        let err = repo
            .insert_transaction_if_absent(txn("T1", "ACT-404", "Safeway", "Groceries", 1))
            .await
            .unwrap_err();

        assert!(err.is_persistence());
        assert!(!repo.transaction_exists("T1").unwrap());
    }

    #[tokio::test]
    async fn payee_lookup_prefers_most_recent_categorized_row() {
        let (_dir, repo) = seeded_repo().await;
        for t in [
            txn("T1", "ACT-1", "Shell Gas #4412", "Shopping", 100),
            txn("T2", "ACT-1", "Shell Gas #4412", "Transportation", 200),
            txn("T3", "ACT-1", "Shell Gas #4412", "", 300),
            txn("T4", "ACT-1", "shell gas #4412", "Utilities", 400),
        ] {
            repo.insert_transaction_if_absent(t).await.unwrap();
        }

        assert_eq!(
            repo.find_category_by_payee("Shell Gas #4412").unwrap(),
            Some("Transportation".to_string())
        );
        assert_eq!(repo.find_category_by_payee("Chevron").unwrap(), None);
    }

    #[tokio::test]
    async fn user_listing_spans_owned_accounts_only() {
        let (_dir, repo) = seeded_repo().await;
        repo.insert_transaction_if_absent(txn("T1", "ACT-1", "A", "Other", 100))
            .await
            .unwrap();
        repo.insert_transaction_if_absent(txn("T2", "ACT-2", "B", "Other", 200))
            .await
            .unwrap();
        repo.insert_transaction_if_absent(txn("T3", "ACT-3", "C", "Other", 300))
            .await
            .unwrap();

        let ids: Vec<String> = repo
            .list_transactions_for_user("user-1")
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(ids, vec!["T2".to_string(), "T1".to_string()]);
    }

    #[tokio::test]
    async fn category_corrections_only_touch_category() {
        let (_dir, repo) = seeded_repo().await;
        repo.insert_transaction_if_absent(txn("T1", "ACT-1", "Netflix", "Entertainment", 100))
            .await
            .unwrap();

        let changed = repo
            .update_transaction_categories(vec![
                CategoryUpdate {
                    id: "T1".to_string(),
                    category: "Subscriptions".to_string(),
                },
                CategoryUpdate {
                    id: "T-missing".to_string(),
                    category: "Other".to_string(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(changed, 1);
        let stored = repo.list_transactions_for_account("ACT-1").unwrap();
        assert_eq!(stored[0].category, "Subscriptions");
        assert_eq!(stored[0].payee, "Netflix");
        assert_eq!(
            repo.find_category_by_payee("Netflix").unwrap().as_deref(),
            Some("Subscriptions")
        );
    }
}

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use log::{debug, error, info, warn};

use super::sync_model::{SyncResult, SyncScope};
use crate::accounts::{Account, AccountBalanceUpdate, AccountRepositoryTrait};
use crate::categories::{CategoryResolver, TransactionClassifierTrait};
use crate::errors::Result;
use crate::ledger::{AccountSnapshot, LedgerClientTrait};
use crate::transactions::{InsertOutcome, Transaction, TransactionRepositoryTrait};

#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Pulls everything newer than the watermark for `scope` and stores it.
    async fn run_sync(&self, scope: SyncScope) -> Result<SyncResult>;

    /// Stores every account the aggregator exposes, owned by `user_id`.
    async fn discover_accounts(&self, user_id: &str) -> Result<Vec<Account>>;
}

/// Orchestrates aggregator fetches, categorization and persistence.
///
/// Every write commits on its own; a failed run leaves whatever landed before
/// the failure in place and the next watermark resumes from there.
pub struct SyncService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ledger_client: Arc<dyn LedgerClientTrait>,
    category_resolver: CategoryResolver,
}

impl SyncService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        ledger_client: Arc<dyn LedgerClientTrait>,
        classifier: Arc<dyn TransactionClassifierTrait>,
    ) -> Self {
        let category_resolver = CategoryResolver::new(transaction_repository.clone(), classifier);
        Self {
            account_repository,
            transaction_repository,
            ledger_client,
            category_resolver,
        }
    }

    async fn sync_account(&self, snapshot: AccountSnapshot, result: &mut SyncResult) {
        match self
            .account_repository
            .update_account_balance(AccountBalanceUpdate::from(&snapshot))
            .await
        {
            Ok(true) => result.accounts_updated += 1,
            Ok(false) => {
                warn!(
                    "Aggregator returned account {} ({}) which has not been discovered; skipping {} transaction(s)",
                    snapshot.id,
                    snapshot.name,
                    snapshot.transactions.len()
                );
                result.accounts_skipped += 1;
                return;
            }
            Err(e) => {
                error!("Failed to update balance for account {}: {}", snapshot.id, e);
                result.accounts_failed += 1;
            }
        }

        let account_id = snapshot.id;
        for txn in snapshot.transactions {
            match self.transaction_repository.transaction_exists(&txn.id) {
                Ok(true) => {
                    debug!("Transaction {} already stored", txn.id);
                    result.transactions_skipped += 1;
                    continue;
                }
                Ok(false) => {}
                // The conditional insert below still deduplicates.
                Err(e) => warn!("Existence check failed for transaction {}: {}", txn.id, e),
            }

            let resolution = self.category_resolver.resolve(&txn).await;
            if resolution.used_classifier() {
                result.classifier_calls += 1;
            }

            let transaction = Transaction::from_snapshot(&account_id, txn, resolution.category);
            let transaction_id = transaction.id.clone();
            match self
                .transaction_repository
                .insert_transaction_if_absent(transaction.clone())
                .await
            {
                Ok(InsertOutcome::Inserted) => {
                    result.transactions_inserted += 1;
                    result.inserted.push(transaction);
                }
                Ok(InsertOutcome::Duplicate) => {
                    debug!("Transaction {} inserted concurrently; skipped", transaction_id);
                    result.transactions_skipped += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to insert transaction {} for account {}: {}",
                        transaction_id, account_id, e
                    );
                    result.transactions_failed += 1;
                }
            }
        }
    }
}

#[async_trait]
impl SyncServiceTrait for SyncService {
    async fn run_sync(&self, scope: SyncScope) -> Result<SyncResult> {
        let started_at = Instant::now();
        let owned_accounts: Option<HashSet<String>> = match scope.owner_id() {
            Some(user_id) => Some(
                self.account_repository
                    .list_accounts(user_id)?
                    .into_iter()
                    .map(|account| account.id)
                    .collect(),
            ),
            None => None,
        };
        let watermark = self.transaction_repository.get_watermark(&scope)?;
        let mut result = SyncResult::new(scope.clone(), watermark);

        if owned_accounts.as_ref().is_some_and(HashSet::is_empty) {
            info!("No stored accounts for {}; nothing to sync", scope);
            return Ok(result);
        }
        info!("Syncing {} from watermark {}", scope, watermark);

        let snapshots = self
            .ledger_client
            .fetch_since(watermark, scope.account_id())
            .await?;

        for snapshot in snapshots {
            let in_scope = match (scope.account_id(), owned_accounts.as_ref()) {
                (Some(wanted), _) => snapshot.id == wanted,
                (None, Some(owned)) => owned.contains(&snapshot.id),
                (None, None) => true,
            };
            if !in_scope {
                debug!("Ignoring account {} outside of {}", snapshot.id, scope);
                continue;
            }
            self.sync_account(snapshot, &mut result).await;
        }

        result.duration_ms = started_at.elapsed().as_millis() as i64;
        info!(
            "Sync of {} finished in {}ms: {} account(s) updated, {} skipped, {} failed; {} transaction(s) inserted, {} skipped, {} failed; {} classifier call(s)",
            scope,
            result.duration_ms,
            result.accounts_updated,
            result.accounts_skipped,
            result.accounts_failed,
            result.transactions_inserted,
            result.transactions_skipped,
            result.transactions_failed,
            result.classifier_calls
        );
        Ok(result)
    }

    async fn discover_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let snapshots = self.ledger_client.fetch_accounts().await?;
        info!(
            "Discovered {} account(s) at the aggregator for user {}",
            snapshots.len(),
            user_id
        );

        let mut stored = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            let account = Account::from_snapshot(user_id, snapshot);
            stored.push(self.account_repository.upsert_account(account).await?);
        }
        Ok(stored)
    }
}

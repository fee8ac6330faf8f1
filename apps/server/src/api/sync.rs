use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use pocketwise_core::sync::{SyncResult, SyncScope};
use pocketwise_core::transactions::Transaction;

use super::{owned_account, Owner};
use crate::error::ApiResult;
use crate::main_lib::AppState;

/// Refreshes every account the caller owns.
async fn sync_all(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> ApiResult<Json<SyncResult>> {
    info!("Sync of all accounts requested by user {}", owner.0);
    let result = state.sync_service.run_sync(SyncScope::Owner(owner.0)).await?;
    Ok(Json(result))
}

/// Refreshes one of the caller's accounts and returns its full transaction list.
async fn sync_account(
    State(state): State<Arc<AppState>>,
    owner: Owner,
    Path(account_id): Path<String>,
) -> ApiResult<Json<Vec<Transaction>>> {
    owned_account(&state, &owner, &account_id)?;
    state
        .sync_service
        .run_sync(SyncScope::Account(account_id.clone()))
        .await?;
    Ok(Json(
        state
            .transaction_repository
            .list_transactions_for_account(&account_id)?,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_all))
        .route("/sync/:account_id", post(sync_account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{account, state_with};
    use pocketwise_core::ledger::{AccountSnapshot, TransactionSnapshot};
    use rust_decimal_macros::dec;

    fn snapshot(transacted_at: i64) -> AccountSnapshot {
        snapshot_for("ACT-1", "TRN-1", transacted_at)
    }

    fn snapshot_for(account_id: &str, transaction_id: &str, transacted_at: i64) -> AccountSnapshot {
        AccountSnapshot {
            id: account_id.to_string(),
            name: format!("{} checking", account_id),
            currency: "USD".to_string(),
            balance: dec!(812.33),
            available_balance: dec!(800.00),
            balance_date: 1_729_500_000,
            org_name: "First Bank".to_string(),
            transactions: vec![TransactionSnapshot {
                id: transaction_id.to_string(),
                posted: transacted_at,
                transacted_at,
                amount: dec!(-64.99),
                description: "AMAZON MKTPLACE".to_string(),
                payee: "Amazon".to_string(),
                memo: String::new(),
            }],
        }
    }

    #[tokio::test]
    async fn account_sync_returns_refreshed_transactions() {
        let (_dir, state) =
            state_with(vec![snapshot(1_729_390_000)], vec![account("ACT-1", "user-1")]).await;

        let Json(transactions) = sync_account(
            State(state.clone()),
            Owner("user-1".into()),
            Path("ACT-1".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].category, "Shopping");
        let stored = state.account_repository.get_account("ACT-1").unwrap().unwrap();
        assert_eq!(stored.balance, dec!(812.33));
    }

    #[tokio::test]
    async fn full_sync_reports_counts_and_is_idempotent() {
        let (_dir, state) =
            state_with(vec![snapshot(1_729_390_000)], vec![account("ACT-1", "user-1")]).await;

        let Json(first) = sync_all(State(state.clone()), Owner("user-1".into()))
            .await
            .unwrap();
        let Json(second) = sync_all(State(state), Owner("user-1".into()))
            .await
            .unwrap();

        assert_eq!(first.transactions_inserted, 1);
        assert_eq!(second.transactions_inserted, 0);
        assert_eq!(second.transactions_skipped, 1);
    }

    #[tokio::test]
    async fn full_sync_only_reports_callers_accounts() {
        let (_dir, state) = state_with(
            vec![
                snapshot_for("ACT-1", "TRN-1", 1_729_390_000),
                snapshot_for("ACT-2", "TRN-SECRET", 1_729_390_000),
            ],
            vec![account("ACT-1", "user-1"), account("ACT-2", "user-2")],
        )
        .await;

        let Json(result) = sync_all(State(state.clone()), Owner("user-1".into()))
            .await
            .unwrap();

        assert_eq!(result.scope, SyncScope::Owner("user-1".to_string()));
        assert_eq!(result.accounts_updated, 1);
        let ids: Vec<&str> = result.inserted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["TRN-1"]);
        assert!(!state
            .transaction_repository
            .transaction_exists("TRN-SECRET")
            .unwrap());
        let untouched = state.account_repository.get_account("ACT-2").unwrap().unwrap();
        assert_eq!(untouched.balance, dec!(100.00));
    }
}

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use pocketwise_core::accounts::Account;
use pocketwise_core::transactions::Transaction;

use super::{owned_account, Owner};
use crate::error::ApiResult;
use crate::main_lib::AppState;

async fn list_accounts(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(state.account_repository.list_accounts(&owner.0)?))
}

/// Stores every account the aggregator exposes under the caller's id.
async fn discover_accounts(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> ApiResult<Json<Vec<Account>>> {
    info!("Discovering aggregator accounts for user {}", owner.0);
    let accounts = state.sync_service.discover_accounts(&owner.0).await?;
    Ok(Json(accounts))
}

async fn list_account_transactions(
    State(state): State<Arc<AppState>>,
    owner: Owner,
    Path(account_id): Path<String>,
) -> ApiResult<Json<Vec<Transaction>>> {
    owned_account(&state, &owner, &account_id)?;
    Ok(Json(
        state
            .transaction_repository
            .list_transactions_for_account(&account_id)?,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/discover", post(discover_accounts))
        .route(
            "/accounts/:account_id/transactions",
            get(list_account_transactions),
        )
}

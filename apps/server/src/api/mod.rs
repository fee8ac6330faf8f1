//! HTTP routes.

mod accounts;
mod sync;
mod transactions;

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use pocketwise_core::accounts::Account;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity taken from the `X-User-ID` header set by the auth layer in front of us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

pub fn owner_from_headers(headers: &HeaderMap) -> ApiResult<Owner> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| Owner(value.to_string()))
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid X-User-ID header".to_string()))
}

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        owner_from_headers(&parts.headers)
    }
}

/// Loads an account and checks that `owner` holds it. Foreign accounts look missing.
pub(crate) fn owned_account(state: &AppState, owner: &Owner, account_id: &str) -> ApiResult<Account> {
    state
        .account_repository
        .get_account(account_id)?
        .filter(|account| account.user_id == owner.0)
        .ok_or_else(|| ApiError::NotFound(format!("Account {} not found", account_id)))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(accounts::router())
        .merge(transactions::router())
        .merge(sync::router())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use pocketwise_core::accounts::{Account, AccountRepositoryTrait};
    use pocketwise_core::errors::Result;
    use pocketwise_core::ledger::{AccountSnapshot, LedgerClientTrait};
    use pocketwise_core::categories::TransactionClassifierTrait;
    use pocketwise_core::sync::SyncService;
    use pocketwise_storage_sqlite::{
        create_pool, init, run_migrations, spawn_writer, AccountRepository, TransactionRepository,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use crate::main_lib::AppState;

    pub struct StaticLedger(pub Vec<AccountSnapshot>);

    #[async_trait]
    impl LedgerClientTrait for StaticLedger {
        async fn fetch_since(
            &self,
            _start_date: i64,
            _account_id: Option<&str>,
        ) -> Result<Vec<AccountSnapshot>> {
            Ok(self.0.clone())
        }

        async fn fetch_accounts(&self) -> Result<Vec<AccountSnapshot>> {
            Ok(self.0.clone())
        }
    }

    pub struct FixedClassifier;

    #[async_trait]
    impl TransactionClassifierTrait for FixedClassifier {
        async fn classify(&self, _description: &str, _amount: &Decimal) -> Result<String> {
            Ok("Shopping".to_string())
        }
    }

    pub fn account(id: &str, user_id: &str) -> Account {
        Account {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: format!("{} checking", id),
            account_type: "General".to_string(),
            currency: "USD".to_string(),
            balance: dec!(100.00),
            available_balance: dec!(100.00),
            balance_date: 0,
            org_name: "First Bank".to_string(),
        }
    }

    /// State backed by a temporary database and a ledger that always returns `snapshots`.
    pub async fn state_with(
        snapshots: Vec<AccountSnapshot>,
        accounts: Vec<Account>,
    ) -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pocketwise.db");
        let db_path = init(&path.to_string_lossy()).expect("init");
        run_migrations(&db_path).expect("migrate");
        let pool = create_pool(&db_path).expect("pool");
        let writer = spawn_writer(pool.as_ref().clone());

        let account_repository = Arc::new(AccountRepository::new(pool.clone(), writer.clone()));
        for account in accounts {
            account_repository.upsert_account(account).await.expect("seed account");
        }
        let transaction_repository = Arc::new(TransactionRepository::new(pool, writer));
        let sync_service = Arc::new(SyncService::new(
            account_repository.clone(),
            transaction_repository.clone(),
            Arc::new(StaticLedger(snapshots)),
            Arc::new(FixedClassifier),
        ));

        (
            dir,
            Arc::new(AppState {
                account_repository,
                transaction_repository,
                sync_service,
            }),
        )
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use pocketwise_core::categories::match_taxonomy;
use pocketwise_core::transactions::{CategoryUpdate, Transaction};

use super::Owner;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryUpdatesRequest {
    #[serde(rename = "updatedTxns")]
    pub updated_transactions: Vec<CategoryUpdate>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdatesResponse {
    pub updated: usize,
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    owner: Owner,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(
        state
            .transaction_repository
            .list_transactions_for_user(&owner.0)?,
    ))
}

/// Manual category corrections. Labels are normalized onto the taxonomy and
/// every id must belong to one of the caller's accounts.
async fn update_categories(
    State(state): State<Arc<AppState>>,
    owner: Owner,
    Json(request): Json<CategoryUpdatesRequest>,
) -> ApiResult<Json<CategoryUpdatesResponse>> {
    if request.updated_transactions.is_empty() {
        return Ok(Json(CategoryUpdatesResponse { updated: 0 }));
    }

    let owned: HashSet<String> = state
        .transaction_repository
        .list_transactions_for_user(&owner.0)?
        .into_iter()
        .map(|t| t.id)
        .collect();

    let mut updates = Vec::with_capacity(request.updated_transactions.len());
    for update in request.updated_transactions {
        let category = match_taxonomy(&update.category).ok_or_else(|| {
            ApiError::BadRequest(format!("'{}' is not a known category", update.category))
        })?;
        if !owned.contains(&update.id) {
            return Err(ApiError::NotFound(format!(
                "Transaction {} not found",
                update.id
            )));
        }
        updates.push(CategoryUpdate {
            id: update.id,
            category: category.to_string(),
        });
    }

    let updated = state
        .transaction_repository
        .update_transaction_categories(updates)
        .await?;
    info!("Updated {} transaction categor(ies) for user {}", updated, owner.0);
    Ok(Json(CategoryUpdatesResponse { updated }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/categories", put(update_categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{account, state_with};
    use pocketwise_core::transactions::InsertOutcome;
    use rust_decimal_macros::dec;

    fn stored(id: &str, account_id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            account_id: account_id.to_string(),
            posted: 1_729_400_000,
            transacted_at: 1_729_390_000,
            amount: dec!(-15.49),
            description: "NETFLIX.COM".to_string(),
            payee: "Netflix".to_string(),
            memo: String::new(),
            category: "Entertainment".to_string(),
        }
    }

    fn request(pairs: &[(&str, &str)]) -> Json<CategoryUpdatesRequest> {
        Json(CategoryUpdatesRequest {
            updated_transactions: pairs
                .iter()
                .map(|(id, category)| CategoryUpdate {
                    id: id.to_string(),
                    category: category.to_string(),
                })
                .collect(),
        })
    }

    async fn seeded() -> (tempfile::TempDir, Arc<AppState>) {
        let (dir, state) = state_with(
            Vec::new(),
            vec![account("ACT-1", "user-1"), account("ACT-2", "user-2")],
        )
        .await;
        for (id, account_id) in [("TRN-1", "ACT-1"), ("TRN-2", "ACT-2")] {
            let outcome = state
                .transaction_repository
                .insert_transaction_if_absent(stored(id, account_id))
                .await
                .unwrap();
            assert_eq!(outcome, InsertOutcome::Inserted);
        }
        (dir, state)
    }

    #[test]
    fn request_uses_updated_txns_key() {
        let parsed: CategoryUpdatesRequest = serde_json::from_str(
            r#"{"updatedTxns":[{"id":"TRN-1","category":"Subscriptions"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.updated_transactions[0].category, "Subscriptions");
    }

    #[tokio::test]
    async fn correction_normalizes_label() {
        let (_dir, state) = seeded().await;

        let Json(response) = update_categories(
            State(state.clone()),
            Owner("user-1".into()),
            request(&[("TRN-1", "subscriptions.")]),
        )
        .await
        .unwrap();

        assert_eq!(response, CategoryUpdatesResponse { updated: 1 });
        let Json(listed) = list_transactions(State(state), Owner("user-1".into()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, "Subscriptions");
    }

    #[tokio::test]
    async fn unknown_label_is_rejected() {
        let (_dir, state) = seeded().await;

        let result = update_categories(
            State(state),
            Owner("user-1".into()),
            request(&[("TRN-1", "Streaming")]),
        )
        .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn foreign_transaction_is_not_found() {
        let (_dir, state) = seeded().await;

        let result = update_categories(
            State(state),
            Owner("user-1".into()),
            request(&[("TRN-2", "Other")]),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}

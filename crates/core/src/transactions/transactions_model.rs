use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TransactionSnapshot;

/// A stored transaction. Only `category` may change after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub posted: i64,
    pub transacted_at: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub description: String,
    pub payee: String,
    pub memo: String,
    pub category: String,
}

impl Transaction {
    pub fn from_snapshot(account_id: &str, snapshot: TransactionSnapshot, category: String) -> Self {
        Self {
            id: snapshot.id,
            account_id: account_id.to_string(),
            posted: snapshot.posted,
            transacted_at: snapshot.transacted_at,
            amount: snapshot.amount,
            description: snapshot.description,
            payee: snapshot.payee,
            memo: snapshot.memo,
            category,
        }
    }
}

/// Manual category correction for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub id: String,
    pub category: String,
}

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same identifier already existed; nothing was written.
    Duplicate,
}

//! Database model for transactions.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use pocketwise_core::transactions::Transaction;

use crate::errors::StorageError;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub account_id: String,
    pub posted: i64,
    pub transacted_at: i64,
    pub amount: String,
    pub description: String,
    pub payee: String,
    pub memo: String,
    pub category: String,
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = StorageError;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        Ok(Transaction {
            amount: crate::accounts::parse_decimal("transactions.amount", &db.amount)?,
            id: db.id,
            account_id: db.account_id,
            posted: db.posted,
            transacted_at: db.transacted_at,
            description: db.description,
            payee: db.payee,
            memo: db.memo,
            category: db.category,
        })
    }
}

impl From<Transaction> for TransactionDB {
    fn from(txn: Transaction) -> Self {
        TransactionDB {
            id: txn.id,
            account_id: txn.account_id,
            posted: txn.posted,
            transacted_at: txn.transacted_at,
            amount: txn.amount.to_string(),
            description: txn.description,
            payee: txn.payee,
            memo: txn.memo,
            category: txn.category,
        }
    }
}

//! Database models for accounts.

use std::str::FromStr;

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pocketwise_core::accounts::{Account, AccountBalanceUpdate};

use crate::errors::StorageError;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub balance: String,
    pub available_balance: String,
    pub balance_date: i64,
    pub org_name: String,
}

/// Columns rewritten when discovery sees an account that is already stored.
/// Owner and account type are kept.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
pub struct AccountRefreshDB {
    pub name: String,
    pub currency: String,
    pub balance: String,
    pub available_balance: String,
    pub balance_date: i64,
    pub org_name: String,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
pub struct AccountBalanceDB {
    pub balance: String,
    pub available_balance: String,
    pub balance_date: i64,
}

pub fn parse_decimal(column: &str, value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::InvalidValue(format!("{} '{}': {}", column, value, e)))
}

impl TryFrom<AccountDB> for Account {
    type Error = StorageError;

    fn try_from(db: AccountDB) -> Result<Self, Self::Error> {
        Ok(Account {
            balance: parse_decimal("accounts.balance", &db.balance)?,
            available_balance: parse_decimal("accounts.available_balance", &db.available_balance)?,
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            account_type: db.account_type,
            currency: db.currency,
            balance_date: db.balance_date,
            org_name: db.org_name,
        })
    }
}

impl From<Account> for AccountDB {
    fn from(account: Account) -> Self {
        AccountDB {
            id: account.id,
            user_id: account.user_id,
            name: account.name,
            account_type: account.account_type,
            currency: account.currency,
            balance: account.balance.to_string(),
            available_balance: account.available_balance.to_string(),
            balance_date: account.balance_date,
            org_name: account.org_name,
        }
    }
}

impl From<&AccountDB> for AccountRefreshDB {
    fn from(db: &AccountDB) -> Self {
        AccountRefreshDB {
            name: db.name.clone(),
            currency: db.currency.clone(),
            balance: db.balance.clone(),
            available_balance: db.available_balance.clone(),
            balance_date: db.balance_date,
            org_name: db.org_name.clone(),
        }
    }
}

impl From<&AccountBalanceUpdate> for AccountBalanceDB {
    fn from(update: &AccountBalanceUpdate) -> Self {
        AccountBalanceDB {
            balance: update.balance.to_string(),
            available_balance: update.available_balance.to_string(),
            balance_date: update.balance_date,
        }
    }
}

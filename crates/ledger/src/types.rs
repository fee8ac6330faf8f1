//! Wire types for the aggregator's `/accounts` endpoint.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use pocketwise_core::ledger::{AccountSnapshot, TransactionSnapshot};

use crate::error::{LedgerError, Result};

/// Top-level account-set response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSet {
    /// Human-readable problems reported alongside partial data.
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    pub accounts: Vec<LedgerAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerAccount {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub balance: String,
    #[serde(rename = "available-balance", default)]
    pub available_balance: Option<String>,
    #[serde(rename = "balance-date")]
    pub balance_date: i64,
    #[serde(default)]
    pub org: LedgerOrg,
    #[serde(default)]
    pub transactions: Vec<LedgerTransaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerOrg {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    pub posted: i64,
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub transacted_at: Option<i64>,
}

fn parse_amount(field: &str, owner: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| {
        LedgerError::decode(format!("{} of {} is not a decimal ('{}'): {}", field, owner, value, e))
    })
}

impl TryFrom<LedgerTransaction> for TransactionSnapshot {
    type Error = LedgerError;

    fn try_from(txn: LedgerTransaction) -> Result<Self> {
        let amount = parse_amount("amount", &format!("transaction {}", txn.id), &txn.amount)?;
        Ok(TransactionSnapshot {
            transacted_at: txn.transacted_at.unwrap_or(txn.posted),
            id: txn.id,
            posted: txn.posted,
            amount,
            description: txn.description,
            payee: txn.payee.unwrap_or_default(),
            memo: txn.memo.unwrap_or_default(),
        })
    }
}

impl TryFrom<LedgerAccount> for AccountSnapshot {
    type Error = LedgerError;

    fn try_from(account: LedgerAccount) -> Result<Self> {
        let owner = format!("account {}", account.id);
        let balance = parse_amount("balance", &owner, &account.balance)?;
        let available_balance = match account.available_balance.as_deref() {
            Some(raw) => parse_amount("available-balance", &owner, raw)?,
            None => balance,
        };
        let transactions = account
            .transactions
            .into_iter()
            .map(TransactionSnapshot::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(AccountSnapshot {
            id: account.id,
            name: account.name,
            currency: account.currency,
            balance,
            available_balance,
            balance_date: account.balance_date,
            org_name: account.org.name.unwrap_or_default(),
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const BODY: &str = r#"{
        "errors": [],
        "accounts": [{
            "org": {"domain": "firstbank.example", "name": "First Bank", "sfin-url": "https://sfin.example"},
            "id": "ACT-1",
            "name": "Everyday Checking",
            "currency": "USD",
            "balance": "1520.40",
            "balance-date": 1729500000,
            "transactions": [
                {"id": "TRN-1", "posted": 1729400000, "amount": "-45.67",
                 "description": "OLIVE GARDEN #112", "payee": "Olive Garden", "memo": "",
                 "transacted_at": 1729390000},
                {"id": "TRN-2", "posted": 1729410000, "amount": "2500.00",
                 "description": "PAYROLL"}
            ]
        }]
    }"#;

    #[test]
    fn missing_optional_fields_take_defaults() {
        let set: AccountSet = serde_json::from_str(BODY).unwrap();
        let snapshot = AccountSnapshot::try_from(set.accounts[0].clone()).unwrap();

        assert_eq!(snapshot.balance, dec!(1520.40));
        assert_eq!(snapshot.available_balance, dec!(1520.40));
        assert_eq!(snapshot.org_name, "First Bank");
        assert_eq!(snapshot.transactions[0].transacted_at, 1729390000);
        assert_eq!(snapshot.transactions[1].transacted_at, 1729410000);
        assert_eq!(snapshot.transactions[1].payee, "");
        assert_eq!(snapshot.transactions[1].amount, dec!(2500.00));
    }

    #[test]
    fn bad_amount_is_a_decode_error() {
        let body = BODY.replace("\"-45.67\"", "\"forty\"");
        let set: AccountSet = serde_json::from_str(&body).unwrap();
        let err = AccountSnapshot::try_from(set.accounts[0].clone()).unwrap_err();

        assert!(matches!(err, LedgerError::Decode(ref m) if m.contains("TRN-1")));
    }
}

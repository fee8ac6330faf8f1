use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AccountSnapshot;

/// Account type assigned at discovery until something better classifies it.
pub const DEFAULT_ACCOUNT_TYPE: &str = "General";

/// A stored account. Exactly one row exists per aggregator account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_balance: Decimal,
    /// Seconds since epoch of the balance snapshot.
    pub balance_date: i64,
    pub org_name: String,
}

impl Account {
    /// Builds the row stored by account discovery.
    pub fn from_snapshot(user_id: &str, snapshot: &AccountSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            user_id: user_id.to_string(),
            name: snapshot.name.clone(),
            account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
            currency: snapshot.currency.clone(),
            balance: snapshot.balance,
            available_balance: snapshot.available_balance,
            balance_date: snapshot.balance_date,
            org_name: snapshot.org_name.clone(),
        }
    }
}

/// Balance triple written by every sync run. Last writer wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalanceUpdate {
    pub account_id: String,
    pub balance: Decimal,
    pub available_balance: Decimal,
    pub balance_date: i64,
}

impl From<&AccountSnapshot> for AccountBalanceUpdate {
    fn from(snapshot: &AccountSnapshot) -> Self {
        Self {
            account_id: snapshot.id.clone(),
            balance: snapshot.balance,
            available_balance: snapshot.available_balance,
            balance_date: snapshot.balance_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot() -> AccountSnapshot {
        AccountSnapshot {
            id: "ACT-1".to_string(),
            name: "Checking".to_string(),
            currency: "USD".to_string(),
            balance: dec!(1520.40),
            available_balance: dec!(1490.00),
            balance_date: 1_729_000_000,
            org_name: "First Bank".to_string(),
            transactions: Vec::new(),
        }
    }

    #[test]
    fn discovered_account_defaults_to_general_type() {
        let account = Account::from_snapshot("user-1", &snapshot());
        assert_eq!(account.account_type, DEFAULT_ACCOUNT_TYPE);
        assert_eq!(account.user_id, "user-1");
        assert_eq!(account.org_name, "First Bank");
    }

    #[test]
    fn balances_serialize_as_text() {
        let account = Account::from_snapshot("user-1", &snapshot());
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["balance"], "1520.40");
        assert_eq!(json["availableBalance"], "1490.00");
    }
}

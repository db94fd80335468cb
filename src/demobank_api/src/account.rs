use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, CardId};

/// Type of account
///
/// Kinds are an open set: anything that is not checking or savings is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountKind {
    Checking,
    Savings,
    Other(String),
}

impl AccountKind {
    pub fn as_str(&self) -> &str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::Other(kind) => kind,
        }
    }
}

impl From<String> for AccountKind {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "checking" => AccountKind::Checking,
            "savings" | "saving" => AccountKind::Savings,
            _ => AccountKind::Other(s.trim().to_string()),
        }
    }
}

impl From<&str> for AccountKind {
    fn from(s: &str) -> Self {
        AccountKind::from(s.to_string())
    }
}

impl From<AccountKind> for String {
    fn from(kind: AccountKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    /// Masked account number, only the last four digits are shown
    pub number: String,
    pub balance: Decimal,
    /// Card owning this account, `None` for accounts of the default partition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<CardId>,
}

impl Account {
    pub fn new(id: AccountId, kind: AccountKind, balance: Decimal, card_id: Option<CardId>) -> Self {
        Self {
            id,
            kind,
            number: mask_account_number(id),
            balance,
            card_id,
        }
    }
}

/// Display number derived from the account id, e.g. `****0042`
pub fn mask_account_number(id: AccountId) -> String {
    format!("****{:04}", id.get() % 10_000)
}

/// Sum of the balances of `accounts`, capped at the bounds of `Decimal`
pub fn total_balance(accounts: &[Account]) -> Decimal {
    accounts
        .iter()
        .fold(Decimal::ZERO, |total, a| total.saturating_add(a.balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn kind_keeps_unknown_values() {
        assert_eq!(AccountKind::from("Checking"), AccountKind::Checking);
        assert_eq!(AccountKind::from("saving"), AccountKind::Savings);
        assert_eq!(
            AccountKind::from("Brokerage"),
            AccountKind::Other("Brokerage".to_string())
        );
        assert_eq!(AccountKind::from("Brokerage").to_string(), "Brokerage");
    }

    #[test]
    fn account_json_shape() {
        let account = Account::new(AccountId::new(42).unwrap(), AccountKind::Savings, dec!(12.5), None);
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["type"], "savings");
        assert_eq!(json["number"], "****0042");
        assert!(json.get("cardId").is_none());

        let back: Account = serde_json::from_value(json).unwrap();
        assert_eq!(back, account);
    }

    #[test]
    fn total_balance_sums_accounts() {
        let accounts = vec![
            Account::new(AccountId::new(1).unwrap(), AccountKind::Checking, dec!(100), None),
            Account::new(AccountId::new(2).unwrap(), AccountKind::Savings, dec!(20.25), None),
        ];
        assert_eq!(total_balance(&accounts), dec!(120.25));
    }

    #[test]
    fn total_balance_is_capped_instead_of_overflowing() {
        let accounts = vec![
            Account::new(AccountId::new(1).unwrap(), AccountKind::Checking, Decimal::MAX, None),
            Account::new(AccountId::new(2).unwrap(), AccountKind::Savings, Decimal::MAX, None),
        ];
        assert_eq!(total_balance(&accounts), Decimal::MAX);
    }
}

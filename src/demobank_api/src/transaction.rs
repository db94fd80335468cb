use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdrawal => write!(f, "withdrawal"),
            TransactionKind::Transfer => write!(f, "transfer"),
        }
    }
}

/// An entry of the local transaction log
///
/// `amount` is signed from the point of view of `account_id`: positive for a credit,
/// negative for a debit. A transfer produces two records, one per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub account_id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<AccountId>,
}

impl TransactionRecord {
    pub fn is_credit(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }
}

/// Next id after `last`: the current timestamp, bumped when it would not be increasing
pub fn next_transaction_id(now_millis: i64, last: Option<TransactionId>) -> TransactionId {
    match last {
        Some(last) if last.get() >= now_millis => TransactionId::from(last.get() + 1),
        _ => TransactionId::from(now_millis),
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    account::AccountKind,
    transaction::TransactionKind,
    types::{AccountId, TransactionId},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: Decimal,
}

/// Body of the deposit and withdraw endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOperation {
    pub account_id: AccountId,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOperation {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A transaction as returned by the backend
///
/// Unlike local records, `amount` is always positive: the direction follows from the
/// accounts and users on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub from_account_id: Option<AccountId>,
    #[serde(default)]
    pub to_account_id: Option<AccountId>,
    #[serde(default)]
    pub from_user_id: Option<u64>,
    #[serde(default)]
    pub to_user_id: Option<u64>,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.page + 1 >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn page_of_transactions_from_backend_json() {
        let json = r#"{
            "content": [
                {"id": 17, "type": "transfer", "amount": "25.00", "description": "Dinner",
                 "date": "2024-06-01", "fromAccountId": 3, "toAccountId": 8,
                 "fromUserId": 1, "toUserId": 2},
                {"id": 16, "type": "deposit", "amount": 100, "toAccountId": 3}
            ],
            "page": 0,
            "size": 10,
            "totalElements": 2,
            "totalPages": 1
        }"#;
        let page: Page<RemoteTransaction> = serde_json::from_str(json).unwrap();
        assert_eq!(page.content.len(), 2);
        assert!(page.is_last());

        let transfer = &page.content[0];
        assert_eq!(transfer.kind, TransactionKind::Transfer);
        assert_eq!(transfer.amount, dec!(25.00));
        assert_eq!(transfer.to_account_id, Some(AccountId::from(8)));
        assert_eq!(page.content[1].description, None);
        assert_eq!(page.content[1].date, None);
    }

    #[test]
    fn operations_use_camel_case() {
        let body = TransferOperation {
            from_account_id: AccountId::from(1),
            to_account_id: AccountId::from(2),
            amount: dec!(30),
            description: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["fromAccountId"], 1);
        assert_eq!(json["toAccountId"], 2);
        assert!(json.get("description").is_none());
    }
}

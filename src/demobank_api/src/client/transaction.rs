use anyhow::Result;
use rust_decimal::Decimal;
use tracing::info;

use crate::types::AccountId;

use super::{
    models::{AccountOperation, Page, RemoteTransaction, TransferOperation},
    DemoBankClient,
};

impl DemoBankClient {
    /// Get one page of the transaction history, newest first.
    ///
    /// # Arguments
    ///
    /// * `page` - Zero based page index.
    /// * `size` - Number of transactions per page.
    pub async fn transactions(&self, page: u32, size: u32) -> Result<Page<RemoteTransaction>> {
        let response = self
            .client
            .get(self.url("/transactions"))
            .headers(self.get_headers()?)
            .query(&[("page", page), ("size", size)])
            .send()
            .await?;
        self.parse(response, "transactions").await
    }

    pub async fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<RemoteTransaction> {
        let body = AccountOperation {
            account_id: account,
            amount,
            description: description.map(str::to_string),
        };
        let transaction = self.post_operation("/transactions/deposit", &body, "deposit").await?;
        info!(%account, %amount, "Remote deposit done");
        Ok(transaction)
    }

    pub async fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<RemoteTransaction> {
        let body = AccountOperation {
            account_id: account,
            amount,
            description: description.map(str::to_string),
        };
        let transaction = self.post_operation("/transactions/withdraw", &body, "withdraw").await?;
        info!(%account, %amount, "Remote withdrawal done");
        Ok(transaction)
    }

    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        reason: Option<&str>,
    ) -> Result<RemoteTransaction> {
        let body = TransferOperation {
            from_account_id: from,
            to_account_id: to,
            amount,
            description: reason.map(str::to_string),
        };
        let transaction = self.post_operation("/transactions/transfer", &body, "transfer").await?;
        info!(%from, %to, %amount, "Remote transfer done");
        Ok(transaction)
    }

    async fn post_operation<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<RemoteTransaction> {
        let response = self
            .client
            .post(self.url(path))
            .headers(self.get_headers()?)
            .json(body)
            .send()
            .await?;
        self.parse(response, what).await
    }
}

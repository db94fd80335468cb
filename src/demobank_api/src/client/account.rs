use anyhow::Result;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    account::{Account, AccountKind},
    card::Card,
};

use super::{models::NewAccount, DemoBankClient};

impl DemoBankClient {
    /// Get the accounts of the logged in user.
    pub async fn accounts(&self) -> Result<Vec<Account>> {
        let response = self
            .client
            .get(self.url("/accounts"))
            .headers(self.get_headers()?)
            .send()
            .await?;
        self.parse(response, "accounts").await
    }

    /// Open an account on the backend.
    ///
    /// # Arguments
    ///
    /// * `kind` - Type of the new account.
    /// * `balance` - Opening balance.
    pub async fn create_account(&self, kind: AccountKind, balance: Decimal) -> Result<Account> {
        let response = self
            .client
            .post(self.url("/accounts"))
            .headers(self.get_headers()?)
            .json(&NewAccount { kind, balance })
            .send()
            .await?;
        let account: Account = self.parse(response, "create account").await?;
        info!(id = %account.id, kind = %account.kind, "Remote account created");
        Ok(account)
    }

    /// Get the cards of the logged in user.
    pub async fn cards(&self) -> Result<Vec<Card>> {
        let response = self
            .client
            .get(self.url("/cards"))
            .headers(self.get_headers()?)
            .send()
            .await?;
        self.parse(response, "cards").await
    }
}

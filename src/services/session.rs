use anyhow::Result;
use tracing::warn;

use demobank_api::client::{models::User, DemoBankClient};

/// Gate for commands that need a logged in user
pub struct SessionGuard<'a> {
    client: &'a DemoBankClient,
}

impl<'a> SessionGuard<'a> {
    pub fn new(client: &'a DemoBankClient) -> Self {
        Self { client }
    }

    /// The stored user, or `None` after telling the user to log in first
    pub fn require(&self) -> Result<Option<User>> {
        match self.client.stored_user()? {
            Some(user) => Ok(Some(user)),
            None => {
                warn!("You are not logged in, please run `demobank login` first");
                Ok(None)
            }
        }
    }
}

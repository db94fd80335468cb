use anyhow::{bail, Result};
use reqwest::StatusCode;
use tracing::info;

use crate::{
    constants::{AUTH_FLAG_KEY, TOKEN_KEY, USER_KEY},
    storage::{load_json, save_json},
    types::{Password, Username},
};

use super::{
    error::ClientError,
    models::{LoginResponse, NewUser, User},
    DemoBankClient,
};

impl DemoBankClient {
    /// Log in and persist the returned token and user.
    ///
    /// # Returns
    ///
    /// The logged in user. Fails with [`ClientError::InvalidCredentials`] when the backend
    /// refuses the username or password.
    pub async fn login(&self, username: &Username, password: &Password) -> Result<User> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({
                "username": username.as_str(),
                "password": password.as_str(),
            }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            bail!(ClientError::InvalidCredentials);
        }
        let login: LoginResponse = self.parse(response, "login").await?;

        save_json(self.store.as_ref(), TOKEN_KEY, &login.token)?;
        save_json(self.store.as_ref(), USER_KEY, &login.user)?;
        save_json(self.store.as_ref(), AUTH_FLAG_KEY, &true)?;
        info!(username = %login.user.username, "Logged in");

        Ok(login.user)
    }

    pub async fn register(&self, new_user: &NewUser) -> Result<User> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(new_user)
            .send()
            .await?;
        let user: User = self.parse(response, "register").await?;
        info!(username = %user.username, "Registered");
        Ok(user)
    }

    /// Forget the stored session. The backend keeps no server side session to close.
    pub fn logout(&self) -> Result<()> {
        self.clear_session()?;
        info!("Logged out");
        Ok(())
    }

    /// Fetch the profile of the logged in user
    pub async fn current_user(&self) -> Result<User> {
        let response = self
            .client
            .get(self.url("/users/me"))
            .headers(self.get_headers()?)
            .send()
            .await?;
        self.parse(response, "current user").await
    }

    /// User saved by the last login, if the session is still present
    pub fn stored_user(&self) -> Result<Option<User>> {
        if !self.is_authenticated()? {
            return Ok(None);
        }
        Ok(load_json(self.store.as_ref(), USER_KEY)?)
    }

    /// Whether both the authentication flag and a token are stored
    pub fn is_authenticated(&self) -> Result<bool> {
        let flag = load_json::<bool>(self.store.as_ref(), AUTH_FLAG_KEY)?.unwrap_or(false);
        Ok(flag && self.store.get(TOKEN_KEY)?.is_some())
    }
}

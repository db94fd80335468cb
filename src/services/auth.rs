use anyhow::Result;
use std::{
    io::{stdout, Write},
    sync::Arc,
};
use tracing::{info, warn};

use crate::settings::SettingsStore;
use demobank_api::{
    client::{
        error::ClientError,
        models::{NewUser, User},
        DemoBankClient,
    },
    storage::KeyValueStore,
    types::{Password, Username},
};

pub trait CredentialsProvider {
    fn read_password(&self) -> Result<Password>;
}
pub struct StdinCredentialsProvider;
impl CredentialsProvider for StdinCredentialsProvider {
    fn read_password(&self) -> Result<Password> {
        print!("\nEnter your password (hidden): ");
        let _ = stdout().flush();
        let password = Password::new(&rpassword::read_password()?)?;
        println!();
        Ok(password)
    }
}

pub trait ClientFactory {
    fn new_client(&self, api_url: &str, store: Arc<dyn KeyValueStore>) -> Result<DemoBankClient>;
}
pub struct DefaultClientFactory;
impl ClientFactory for DefaultClientFactory {
    fn new_client(&self, api_url: &str, store: Arc<dyn KeyValueStore>) -> Result<DemoBankClient> {
        demobank_api::get_client(api_url, store)
    }
}

pub struct AuthService<'a> {
    settings_store: &'a dyn SettingsStore,
    store: Arc<dyn KeyValueStore>,
    credentials_provider: Box<dyn CredentialsProvider>,
    client_factory: Box<dyn ClientFactory>,
}

impl<'a> AuthService<'a> {
    pub fn new(
        settings_store: &'a dyn SettingsStore,
        store: Arc<dyn KeyValueStore>,
        credentials_provider: Box<dyn CredentialsProvider>,
        client_factory: Box<dyn ClientFactory>,
    ) -> Self {
        Self {
            settings_store,
            store,
            credentials_provider,
            client_factory,
        }
    }

    pub fn with_defaults(settings_store: &'a dyn SettingsStore, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            settings_store,
            store,
            Box::new(StdinCredentialsProvider),
            Box::new(DefaultClientFactory),
        )
    }

    pub fn client(&self) -> Result<DemoBankClient> {
        let settings = self.settings_store.load()?;
        self.client_factory
            .new_client(settings.api_url(), Arc::clone(&self.store))
    }

    /// Log in as `username`, or as the username saved with `config`.
    ///
    /// # Returns
    ///
    /// `None` when no username is known or the credentials are refused.
    pub async fn login(&self, username: Option<Username>) -> Result<Option<User>> {
        let settings = self.settings_store.load()?;
        let username = match username {
            Some(username) => username,
            None => match settings.username.as_deref().map(Username::new) {
                Some(Ok(username)) => username,
                Some(Err(e)) => {
                    warn!("Saved username is invalid ({}), please run `demobank config --username` again", e);
                    return Ok(None);
                }
                None => {
                    warn!("No username given, use `demobank login --username` or `demobank config --username`");
                    return Ok(None);
                }
            },
        };

        info!(
            "We'll try to log you in as {} on {}",
            username.as_str(),
            settings.api_url()
        );
        let password = self.credentials_provider.read_password()?;

        let client = self.client()?;
        match client.login(&username, &password).await {
            Ok(user) => {
                info!("Login successful ✅ Welcome {}", user.display_name());
                Ok(Some(user))
            }
            Err(e) => {
                if let Some(ClientError::InvalidCredentials) = e.downcast_ref::<ClientError>() {
                    warn!("Invalid username or password");
                    Ok(None)
                } else {
                    Err(e)
                }
            }
        }
    }

    pub async fn register(
        &self,
        username: Username,
        email: Option<String>,
        full_name: Option<String>,
    ) -> Result<User> {
        info!("Choose a password for {}. It will not be stored.", username.as_str());
        let password = self.credentials_provider.read_password()?;

        let user = self
            .client()?
            .register(&NewUser {
                username: username.as_str().to_string(),
                password: password.as_str().to_string(),
                email,
                full_name,
            })
            .await?;

        let mut settings = self.settings_store.load()?;
        settings.username = Some(user.username.clone());
        self.settings_store.save(&settings)?;

        info!("Account registered ✅ You can now run `demobank login`");
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.client()?.logout()
    }
}

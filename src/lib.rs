pub mod cli;
pub mod commands;
pub mod services;
pub mod settings;
pub mod ux;

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use cli::{Cli, Commands};
use demobank_api::{
    client::{models::User, DemoBankClient},
    ledger::Ledger,
    storage::{FileStore, KeyValueStore},
};
use services::{AuthService, SessionGuard};
use settings::{FileSettingsStore, JsonFileSettingsStore, SettingsStore};

pub struct AppCtx {
    pub settings_store: Box<dyn SettingsStore>,
    /// Local ledger and session values
    pub store: Arc<dyn KeyValueStore>,
    /// Operate on the REST backend rather than on the local ledger
    pub remote: bool,
}

impl AppCtx {
    pub fn ledger(&self) -> Ledger {
        demobank_api::get_ledger(Arc::clone(&self.store))
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::with_defaults(self.settings_store.as_ref(), Arc::clone(&self.store))
    }

    /// A backend client and the logged in user, or `None` once the user was told to log in
    pub fn session(&self) -> Result<Option<(DemoBankClient, User)>> {
        let client = self.auth().client()?;
        let Some(user) = SessionGuard::new(&client).require()? else {
            return Ok(None);
        };
        Ok(Some((client, user)))
    }
}

#[cfg(not(tarpaulin_include))]
pub async fn run(cli: Cli) -> Result<()> {
    let settings_store: Box<dyn SettingsStore> = match cli.settings {
        Some(path) => Box::new(JsonFileSettingsStore::new(path)),
        None => Box::new(FileSettingsStore::new()?),
    };
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => settings::ledger_dir()?,
    };
    debug!("Using data directory {}", data_dir.display());

    let ctx = AppCtx {
        settings_store,
        store: Arc::new(FileStore::new(data_dir)),
        remote: cli.remote,
    };

    let result = match cli.command {
        Commands::Config(args) => commands::config::handle(args, &ctx).await,
        Commands::Register(args) => commands::auth::register(args, &ctx).await,
        Commands::Login(args) => commands::auth::login(args, &ctx).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Accounts(args) => commands::accounts::handle(args, &ctx).await,
        Commands::Cards(args) => commands::cards::handle(args, &ctx).await,
        Commands::Deposit(args) => commands::transactions::deposit(args, &ctx).await,
        Commands::Withdraw(args) => commands::transactions::withdraw(args, &ctx).await,
        Commands::Transfer(args) => commands::transactions::transfer(args, &ctx).await,
        Commands::History(args) => commands::history::handle(args, &ctx).await,
        Commands::Dashboard(args) => commands::dashboard::handle(args, &ctx).await,
        Commands::Verify => commands::verify::handle(&ctx).await,
        Commands::Reset(args) => commands::reset::handle(args, &ctx).await,
    };
    commands::recover(result)
}

mod consts;
mod logging;
mod store;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub use logging::init_logger;
pub use store::{FileSettingsStore, JsonFileSettingsStore, Settings, SettingsStore};

use consts::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, LEDGER_DIR};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
        .ok_or_else(|| anyhow!("Could not determine project directories"))
}

/// Default directory of the local ledger, under the platform data directory
pub fn ledger_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join(LEDGER_DIR))
}

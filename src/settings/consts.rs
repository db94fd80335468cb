pub const APP_QUALIFIER: &str = "com";
pub const APP_ORGANIZATION: &str = "demobank";
pub const APP_NAME: &str = "demobank-cli";

pub const SETTINGS_FILE: &str = "settings.json";
pub const LEDGER_DIR: &str = "ledger";

pub const LOG_FILE: &str = "demobank.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

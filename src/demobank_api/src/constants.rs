pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

pub const USER_KEY: &str = "user";
pub const AUTH_FLAG_KEY: &str = "isAuthenticated";
pub const TOKEN_KEY: &str = "token";
pub const ACCOUNTS_KEY: &str = "accounts";
pub const CARD_ACCOUNTS_KEY: &str = "cardAccounts";
pub const CARDS_KEY: &str = "cards";
pub const ACTIVE_CARD_KEY: &str = "activeCard";
pub const TRANSACTIONS_KEY: &str = "transactions";

pub const CARD_NUMBER_PATTERN: &str = r"^(?:\d{4} ?){3}\d{4}$";
pub const CARD_EXPIRY_PATTERN: &str = r"^(?P<month>0[1-9]|1[0-2])/(?P<year>\d{2})$";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

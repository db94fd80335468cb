use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use demobank_api::{
    account::AccountKind,
    card::CardTemplate,
    types::{AccountId, CardId, Username},
};

#[derive(Parser)]
#[command(version, author, about, long_about = None)]
pub struct Cli {
    /// Optional path to a settings JSON file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Directory of the local ledger (defaults to the platform data directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Talk to the REST backend instead of the local ledger
    #[arg(short, long, global = true)]
    pub remote: bool,

    /// Raise the console log level (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure the CLI
    Config(ConfigArgs),

    /// Create an account on the backend
    Register(RegisterArgs),

    /// Log in to the backend
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// List or create accounts
    Accounts(AccountsArgs),

    /// Manage your cards and pick the one whose accounts you operate on
    Cards(CardsArgs),

    /// Deposit money on an account
    Deposit(OperationArgs),

    /// Withdraw money from an account
    Withdraw(OperationArgs),

    /// Transfer funds between your accounts
    Transfer(TransferArgs),

    /// Show the transaction history
    History(HistoryArgs),

    /// Summary of balances, cards and recent transactions
    Dashboard(DashboardArgs),

    /// Check stored balances against the transaction log
    Verify,

    /// Delete every locally stored value, session included
    Reset(ResetArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Base URL of the REST backend (e.g: "http://localhost:8080/api")
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Username used by `login` when none is given
    #[arg(short, long, value_name = "NAME", value_parser = parse_username)]
    pub username: Option<Username>,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(short, long, value_name = "NAME", value_parser = parse_username)]
    pub username: Username,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub full_name: Option<String>,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Defaults to the username saved with `config`
    #[arg(short, long, value_name = "NAME", value_parser = parse_username)]
    pub username: Option<Username>,
}

#[derive(Args)]
pub struct AccountsArgs {
    /// List the accounts of every card, not only the selected one
    #[arg(long)]
    pub all: bool,

    #[command(subcommand)]
    pub command: Option<AccountsCommands>,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Open a new account
    Create(CreateAccountArgs),
}

#[derive(Args)]
pub struct CreateAccountArgs {
    /// Type of account (checking, savings, or any other name)
    #[arg(short, long, default_value = "checking", value_parser = parse_account_kind)]
    pub kind: AccountKind,

    /// Opening balance
    #[arg(short, long, default_value = "0")]
    pub balance: String,
}

#[derive(Args)]
pub struct CardsArgs {
    #[command(subcommand)]
    pub command: CardsCommands,
}

#[derive(Subcommand)]
pub enum CardsCommands {
    /// List your cards
    List,

    /// Add a card, with an empty checking and savings account
    Add(AddCardArgs),

    /// Remove a card and its accounts
    Remove(CardIdArgs),

    /// Operate on the accounts of a card, or on the default accounts when no ID is given
    Use(UseCardArgs),
}

#[derive(Args)]
pub struct AddCardArgs {
    #[arg(short, long, value_enum, default_value_t = CardTemplate::Classic)]
    pub template: CardTemplate,

    /// Card number, 16 digits (e.g: "4000 1234 5678 9010")
    #[arg(short, long)]
    pub number: String,

    /// Expiry date as MM/YY
    #[arg(short, long)]
    pub expiry: String,
}

#[derive(Args)]
pub struct CardIdArgs {
    /// Card ID, you can get it with the `demobank cards list` command
    #[arg(value_name = "ID", value_parser = parse_card_id)]
    pub id: CardId,
}

#[derive(Args)]
pub struct UseCardArgs {
    #[arg(value_name = "ID", value_parser = parse_card_id)]
    pub id: Option<CardId>,
}

#[derive(Args)]
pub struct OperationArgs {
    /// Account ID, you can get it with the `demobank accounts` command
    #[arg(short, long, value_name = "ID", value_parser = parse_account_id)]
    pub account: AccountId,

    /// Amount of money
    #[arg(long)]
    pub amount: String,

    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct TransferArgs {
    /// Source account ID, you can get it with the `demobank accounts` command
    #[arg(long = "from", value_name = "ID", value_parser = parse_account_id)]
    pub from_account: AccountId,

    /// Destination account ID, you can get it with the `demobank accounts` command
    #[arg(long = "to", value_name = "ID", value_parser = parse_account_id)]
    pub to_account: AccountId,

    /// Amount to transfer
    #[arg(long)]
    pub amount: String,

    /// Reason for the transfer
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Only show the records of this account
    #[arg(short, long, value_name = "ID", value_parser = parse_account_id)]
    pub account: Option<AccountId>,

    /// Maximum number of entries
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,

    /// Page to fetch from the backend (zero based)
    #[arg(long, default_value_t = 0)]
    pub page: u32,
}

#[derive(Args)]
pub struct DashboardArgs {
    /// Number of recent transactions shown
    #[arg(short, long, default_value_t = demobank_api::constants::DEFAULT_PAGE_SIZE)]
    pub limit: u32,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm the reset
    #[arg(long)]
    pub yes: bool,
}

fn parse_account_id(s: &str) -> Result<AccountId, String> {
    s.parse().map_err(|e: demobank_api::types::ValueError| e.to_string())
}

fn parse_card_id(s: &str) -> Result<CardId, String> {
    s.parse().map_err(|e: demobank_api::types::ValueError| e.to_string())
}

fn parse_account_kind(s: &str) -> Result<AccountKind, String> {
    if s.trim().is_empty() {
        return Err("account type must not be empty".to_string());
    }
    Ok(AccountKind::from(s))
}

fn parse_username(s: &str) -> Result<Username, String> {
    Username::new(s).map_err(|e| e.to_string())
}

use std::str::FromStr;

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    cli::{AccountsArgs, AccountsCommands, CreateAccountArgs},
    commands::with_ledger,
    ux::render::accounts_table,
    AppCtx,
};

use demobank_api::{ledger::Partition, processor::ProcessError};

pub async fn handle(args: AccountsArgs, ctx: &AppCtx) -> Result<()> {
    match args.command {
        Some(AccountsCommands::Create(create)) => create_account(create, ctx).await,
        None => list(args.all, ctx).await,
    }
}

async fn list(all: bool, ctx: &AppCtx) -> Result<()> {
    if ctx.remote {
        let Some((client, _)) = ctx.session()? else {
            return Ok(());
        };
        let accounts = client.accounts().await?;
        info!("Found {} accounts", accounts.len());
        println!("{}", accounts_table(&accounts));
        return Ok(());
    }

    let ledger = ctx.ledger();
    let accounts = if all {
        ledger.all_accounts()?
    } else {
        ledger.accounts()?
    };
    match ledger.active_partition()? {
        _ if all => info!("Found {} accounts", accounts.len()),
        Partition::Default => info!("Found {} accounts", accounts.len()),
        partition => info!("Found {} accounts on {}", accounts.len(), partition),
    }
    println!("{}", accounts_table(&accounts));
    Ok(())
}

async fn create_account(args: CreateAccountArgs, ctx: &AppCtx) -> Result<()> {
    let balance = Decimal::from_str(args.balance.trim()).map_err(|_| ProcessError::InvalidAmount)?;
    if balance < Decimal::ZERO {
        return Err(ProcessError::InvalidAmount.into());
    }
    let kind = args.kind;

    let account = if ctx.remote {
        let Some((client, _)) = ctx.session()? else {
            return Ok(());
        };
        client.create_account(kind, balance).await?
    } else {
        with_ledger(ctx, |ledger| ledger.create_account(kind, balance)).await?
    };

    info!("Account #{} ({}) created ✅", account.id, account.kind);
    Ok(())
}

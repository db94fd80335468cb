use anyhow::Result;
use tracing::info;

use crate::{
    cli::{OperationArgs, TransferArgs},
    commands::with_ledger,
    ux::render::remote_transaction_line,
    AppCtx,
};

use demobank_api::{dashboard::format_amount, processor::parse_amount};

pub async fn deposit(args: OperationArgs, ctx: &AppCtx) -> Result<()> {
    let amount = parse_amount(&args.amount)?;
    let description = args.description.as_deref();

    if ctx.remote {
        let Some((client, _)) = ctx.session()? else {
            return Ok(());
        };
        let transaction = client.deposit(args.account, amount, description).await?;
        println!("{}", remote_transaction_line(&transaction));
    } else {
        with_ledger(ctx, |ledger| ledger.deposit(args.account, amount, description)).await?;
    }

    info!(
        "Deposit of {} on account #{} successful ✅",
        format_amount(amount),
        args.account
    );
    Ok(())
}

pub async fn withdraw(args: OperationArgs, ctx: &AppCtx) -> Result<()> {
    let amount = parse_amount(&args.amount)?;
    let description = args.description.as_deref();

    if ctx.remote {
        let Some((client, _)) = ctx.session()? else {
            return Ok(());
        };
        let transaction = client.withdraw(args.account, amount, description).await?;
        println!("{}", remote_transaction_line(&transaction));
    } else {
        with_ledger(ctx, |ledger| ledger.withdraw(args.account, amount, description)).await?;
    }

    info!(
        "Withdrawal of {} from account #{} successful ✅",
        format_amount(-amount),
        args.account
    );
    Ok(())
}

pub async fn transfer(args: TransferArgs, ctx: &AppCtx) -> Result<()> {
    let amount = parse_amount(&args.amount)?;
    let reason = args.reason.as_deref();
    let (from, to) = (args.from_account, args.to_account);

    if ctx.remote {
        let Some((client, _)) = ctx.session()? else {
            return Ok(());
        };
        let transaction = client.transfer(from, to, amount, reason).await?;
        println!("{}", remote_transaction_line(&transaction));
    } else {
        with_ledger(ctx, |ledger| ledger.transfer(from, to, amount, reason)).await?;
    }

    info!(
        "Transfer of {} from account #{} to account #{} successful ✅",
        format_amount(amount).trim_start_matches('+'),
        from,
        to
    );
    Ok(())
}

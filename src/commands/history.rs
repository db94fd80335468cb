use anyhow::Result;
use tracing::info;

use crate::{cli::HistoryArgs, ux::render::history_table, AppCtx};

use demobank_api::dashboard::{Dashboard, HistoryLine};

pub async fn handle(args: HistoryArgs, ctx: &AppCtx) -> Result<()> {
    let lines = if ctx.remote {
        let Some((client, user)) = ctx.session()? else {
            return Ok(());
        };
        let mut page = client.transactions(args.page, args.limit as u32).await?;
        if let Some(account) = args.account {
            page.content
                .retain(|t| t.from_account_id == Some(account) || t.to_account_id == Some(account));
        }
        let accounts = client.accounts().await?;
        info!("Page {} of {}", page.page + 1, page.total_pages.max(1));
        Dashboard::build(&user, &accounts, &[], &page).recent
    } else {
        let ledger = ctx.ledger();
        let records = match args.account {
            Some(account) => ledger.history_for(account)?,
            None => ledger.history()?,
        };
        records
            .iter()
            .take(args.limit)
            .map(HistoryLine::from)
            .collect()
    };

    info!("Found {} transactions", lines.len());
    println!("{}", history_table(&lines));
    Ok(())
}

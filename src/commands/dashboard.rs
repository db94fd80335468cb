use anyhow::Result;

use crate::{cli::DashboardArgs, ux::render::dashboard_view, AppCtx};

use demobank_api::dashboard::Dashboard;

pub async fn handle(args: DashboardArgs, ctx: &AppCtx) -> Result<()> {
    let dashboard = if ctx.remote {
        let Some((client, user)) = ctx.session()? else {
            return Ok(());
        };
        let accounts = client.accounts().await?;
        let cards = client.cards().await?;
        let page = client.transactions(0, args.limit).await?;
        Dashboard::build(&user, &accounts, &cards, &page)
    } else {
        let username = ctx.settings_store.load()?.username;
        Dashboard::from_ledger(&ctx.ledger(), username.as_deref(), args.limit as usize)?
    };

    println!("{}", dashboard_view(&dashboard));
    Ok(())
}

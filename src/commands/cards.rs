use anyhow::Result;
use tracing::{info, warn};

use crate::{
    cli::{AddCardArgs, CardsArgs, CardsCommands},
    commands::with_ledger,
    ux::render::{accounts_table, cards_table},
    AppCtx,
};

use demobank_api::{card::NewCard, ledger::Partition, types::CardId};

pub async fn handle(args: CardsArgs, ctx: &AppCtx) -> Result<()> {
    match args.command {
        CardsCommands::List => list(ctx).await,
        _ if ctx.remote => {
            warn!("Cards can only be listed on the backend, run without --remote to manage local cards");
            Ok(())
        }
        CardsCommands::Add(add) => add_card(add, ctx).await,
        CardsCommands::Remove(remove) => remove_card(remove.id, ctx).await,
        CardsCommands::Use(card) => use_card(card.id, ctx).await,
    }
}

async fn list(ctx: &AppCtx) -> Result<()> {
    if ctx.remote {
        let Some((client, _)) = ctx.session()? else {
            return Ok(());
        };
        let cards = client.cards().await?;
        info!("Found {} cards", cards.len());
        println!("{}", cards_table(&cards, Partition::Default));
        return Ok(());
    }

    let ledger = ctx.ledger();
    let cards = ledger.cards()?;
    info!("Found {} cards", cards.len());
    println!("{}", cards_table(&cards, ledger.active_partition()?));
    Ok(())
}

async fn add_card(args: AddCardArgs, ctx: &AppCtx) -> Result<()> {
    let new_card = NewCard::new(args.template, &args.number, &args.expiry)?;
    let card = with_ledger(ctx, |ledger| ledger.add_card(new_card)).await?;
    info!(
        "Card #{} added ✅ Run `demobank cards use {}` to operate on its accounts",
        card.id, card.id
    );
    Ok(())
}

async fn remove_card(id: CardId, ctx: &AppCtx) -> Result<()> {
    with_ledger(ctx, |ledger| ledger.delete_card(id)).await?;
    info!("Card #{} removed ✅", id);
    Ok(())
}

async fn use_card(id: Option<CardId>, ctx: &AppCtx) -> Result<()> {
    let partition = id.map(Partition::Card).unwrap_or_default();
    with_ledger(ctx, |ledger| ledger.select_partition(partition)).await?;
    println!("{}", accounts_table(&ctx.ledger().accounts()?));
    Ok(())
}

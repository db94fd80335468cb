use anyhow::Result;
use tracing::{info, warn};

use crate::{ux::render::discrepancies_table, AppCtx};

pub async fn handle(ctx: &AppCtx) -> Result<()> {
    let discrepancies = ctx.ledger().verify()?;
    if discrepancies.is_empty() {
        info!("Balances match the transaction log ✅");
    } else {
        warn!(
            "{} account(s) do not match the transaction log",
            discrepancies.len()
        );
        println!("{}", discrepancies_table(&discrepancies));
    }
    Ok(())
}

use anyhow::Result;
use tracing::warn;

use crate::{cli::ResetArgs, commands::with_ledger, AppCtx};

pub async fn handle(args: ResetArgs, ctx: &AppCtx) -> Result<()> {
    if !args.yes {
        warn!("This deletes every account, card, transaction and the stored session. Run again with --yes to confirm");
        return Ok(());
    }
    with_ledger(ctx, |ledger| ledger.clear()).await
}

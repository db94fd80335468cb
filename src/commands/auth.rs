use anyhow::Result;
use tracing::info;

use crate::{
    cli::{LoginArgs, RegisterArgs},
    AppCtx,
};

pub async fn register(args: RegisterArgs, ctx: &AppCtx) -> Result<()> {
    let user = ctx
        .auth()
        .register(args.username, args.email, args.full_name)
        .await?;
    info!("Registered as {} (#{})", user.username, user.id);
    Ok(())
}

pub async fn login(args: LoginArgs, ctx: &AppCtx) -> Result<()> {
    ctx.auth().login(args.username).await?;
    Ok(())
}

pub async fn logout(ctx: &AppCtx) -> Result<()> {
    ctx.auth().logout()?;
    info!("See you soon 👋");
    Ok(())
}

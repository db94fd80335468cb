use anyhow::Result;
use tracing::{info, warn};

use crate::{cli::ConfigArgs, AppCtx};

pub async fn handle(args: ConfigArgs, ctx: &AppCtx) -> Result<()> {
    let mut settings = ctx.settings_store.load()?;

    if args.api_url.is_none() && args.username.is_none() {
        info!("API URL: {}", settings.api_url());
        info!(
            "Username: {}",
            settings.username.as_deref().unwrap_or("(not set)")
        );
        return Ok(());
    }

    if let Some(api_url) = args.api_url {
        let api_url = api_url.trim().trim_end_matches('/');
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            warn!("The API URL must start with http:// or https://");
            return Ok(());
        }
        settings.api_url = Some(api_url.to_string());
    }
    if let Some(username) = args.username {
        settings.username = Some(username.as_str().to_string());
    }

    ctx.settings_store.save(&settings)?;
    info!("Configuration saved successfully ✅");
    Ok(())
}

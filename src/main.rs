use anyhow::Result;
use clap::Parser;

use demobank_cli::{cli::Cli, settings::init_logger};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;
    demobank_cli::run(cli).await?;
    Ok(())
}

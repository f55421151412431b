//! Asset Inventory Server Entry Point

use anyhow::Context;
use asset_inventory::cli::{serve::ServeArgs, Cli, Commands};
use asset_inventory::{bootstrap, logging, server};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let args = match cli.command {
        Some(Commands::Serve(args)) => args,
        // No subcommand - default to serve
        None => ServeArgs::from_env(),
    };

    logging::init().context("failed to initialize logging")?;

    let state = bootstrap::initialize()
        .await
        .context("failed to initialize server")?;

    server::run(state, &args.bind_addr())
        .await
        .with_context(|| format!("server error on {}", args.bind_addr()))?;

    Ok(())
}

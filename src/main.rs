//! Rackgen CLI - Declarative Rack-Device Generator
//!
//! Command-line interface for the rackgen pipeline.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use rackgen::cli::{commands, Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Rackgen v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Generate {
            bundle,
            device,
            out,
        }) => {
            commands::generate(&bundle, &device, &out).await?;
        }
        Some(Commands::Preview {
            bundle,
            device,
            out,
            panel,
        }) => {
            commands::preview(&bundle, &device, &out, panel.as_deref()).await?;
        }
        None => {
            println!("Rackgen v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
        }
    }

    Ok(())
}

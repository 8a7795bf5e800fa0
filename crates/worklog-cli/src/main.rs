//! Worklog CLI - offline-first work time tracking from the terminal
//!
//! Every change lands in the local store first and is replayed against the
//! remote API whenever it is reachable.

mod cli;
mod commands;
mod config;
mod error;
mod remote;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::Context;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::purge::run_purge;
use crate::commands::queue::run_queue;
use crate::commands::start::run_start;
use crate::commands::status::run_status;
use crate::commands::stop::run_stop;
use crate::commands::switch::run_switch;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "worklog=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { tags, description } => {
            run_start(&description, &tags, &Context::load(&cli.global)?).await?;
        }
        Commands::Stop { tags, description } => {
            run_stop(&description, &tags, &Context::load(&cli.global)?).await?;
        }
        Commands::Switch { tags, description } => {
            run_switch(&description, &tags, &Context::load(&cli.global)?).await?;
        }
        Commands::Status { json } => run_status(json, &Context::load(&cli.global)?).await?,
        Commands::Queue { json } => run_queue(json, &Context::load(&cli.global)?).await?,
        Commands::Sync => run_sync(&Context::load(&cli.global)?).await?,
        Commands::Purge => run_purge(&Context::load(&cli.global)?).await?,
        Commands::Config { command } => run_config(command)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}

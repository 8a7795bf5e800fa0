use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "worklog")]
#[command(about = "Track work time from the command line, online or not")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Treat the network as unavailable; changes are only queued
    #[arg(long, global = true)]
    pub offline: bool,

    /// User id owning the work logs (overrides config)
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start tracking a new work session
    #[command(alias = "begin")]
    Start {
        /// Tag for the session (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// What you are working on
        description: Vec<String>,
    },
    /// Stop the active session
    Stop {
        /// Replace the session's tags (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Replace the session's description
        description: Vec<String>,
    },
    /// Stop the active session and start the next one
    Switch {
        /// Tag for the new session (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// What you are switching to
        description: Vec<String>,
    },
    /// Show the active session and sync state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List queued changes in the order they will be sent
    Queue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send queued changes to the remote API now
    Sync,
    /// Remove finished work logs the server already confirmed
    Purge,
    /// Configure the CLI
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update the config file
    Init {
        /// Remote work log API base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Bearer token sent to the API
        #[arg(long, value_name = "TOKEN")]
        api_token: Option<String>,
        /// Default user id for new work logs
        #[arg(long, value_name = "ID")]
        user_id: Option<String>,
    },
    /// Print the effective configuration
    Show,
}

//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::{init::InitArgs, status::StatusArgs, sync::SyncArgs, webhook::WebhookArgs};

/// Command line entry point.
#[derive(Parser, Debug)]
#[command(name = "gitman")]
#[command(about = "Mirror GitHub issues and discussions into local files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Store directory (also where config.yaml is read from)
    #[arg(short, long, global = true, env = "GITMAN_DIR")]
    pub directory: Option<PathBuf>,

    /// Repository to sync, as owner/repo (overrides GITHUB_REPO)
    #[arg(short, long, global = true)]
    pub repo: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the local store
    Init(InitArgs),

    /// Sync issues, discussions and comments from GitHub
    Sync(SyncArgs),

    /// Show sync cursor and stored entity counts
    Status(StatusArgs),

    /// Receive, classify and replay webhook deliveries
    Webhook(WebhookArgs),
}

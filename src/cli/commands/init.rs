//! Implementation of the `gitman init` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::file_store::FileStore;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

/// Initialize the local store
#[derive(Args, Debug)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
/// Result of `gitman init`.
pub struct InitOutput {
    /// Storage root.
    pub root: PathBuf,
    /// A cursor file was already present.
    pub already_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let headline = if self.already_initialized {
            format!("Store already initialized at {}", self.root.display())
        } else {
            format!("Initialized store at {}", self.root.display())
        };
        [
            headline.as_str(),
            "",
            "Next steps:",
            "  1. export GITHUB_TOKEN=<personal access token>",
            "  2. export GITHUB_REPO=owner/repo",
            "  3. gitman sync",
        ]
        .join("\n")
    }
}

/// Create the store layout and an empty cursor if none exists.
pub async fn execute(_args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = FileStore::new(&config.storage.root);
    let already_initialized = store.exists().await?;
    store
        .init()
        .await
        .with_context(|| format!("Failed to initialize store at {}", config.storage.root.display()))?;

    output(
        &InitOutput {
            root: config.storage.root.clone(),
            already_initialized,
        },
        json_mode,
    );
    Ok(())
}

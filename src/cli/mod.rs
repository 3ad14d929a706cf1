//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::models::{Config, RepoRef};
use crate::infrastructure::config::loader::DEFAULT_CONFIG_DIR;
use crate::infrastructure::config::ConfigLoader;

pub use types::{Cli, Commands};

/// Load configuration, then apply `--directory` and `--repo`.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let dir = cli
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));
    let mut config = ConfigLoader::load_from_dir(&dir)?;

    if cli.directory.is_some() {
        config.storage.root = dir;
    }
    if let Some(repo) = &cli.repo {
        config.github.repository = Some(repo.clone());
    }
    ConfigLoader::validate(&config)?;
    Ok(config)
}

/// The configured repository, or an error telling the user how to set one.
pub fn require_repo(config: &Config) -> Result<RepoRef> {
    let repo = config
        .github
        .repository
        .as_deref()
        .context("No repository configured: set GITHUB_REPO or pass --repo owner/repo")?;
    Ok(repo.parse()?)
}

/// Print an error and exit with status 1.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "status": "error",
            "error": err.to_string(),
            "causes": chain,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}

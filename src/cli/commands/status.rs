//! Implementation of the `gitman status` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::adapters::file_store::FileStore;
use crate::cli::output::table::key_value_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::DomainError;
use crate::domain::models::{Config, StoreStats, SyncCursor};

/// Show sync cursor and stored entity counts
#[derive(Args, Debug)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
/// Result of `gitman status`.
pub struct StatusOutput {
    /// Storage root.
    pub root: PathBuf,
    /// Persisted cursor.
    pub cursor: SyncCursor,
    /// File counts per kind.
    pub stats: StoreStats,
}

fn timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let table = key_value_table([
            ("Store", self.root.display().to_string()),
            (
                "Repository",
                self.cursor.repository.clone().unwrap_or_else(|| "-".to_string()),
            ),
            ("Last sync", timestamp(self.cursor.last_sync_at)),
            ("Issues synced", timestamp(self.cursor.issues_last_sync_at)),
            ("Discussions synced", timestamp(self.cursor.discussions_last_sync_at)),
            ("Issues", self.stats.issues.to_string()),
            ("Issue comments", self.stats.issue_comments.to_string()),
            ("Discussions", self.stats.discussions.to_string()),
            ("Discussion comments", self.stats.discussion_comments.to_string()),
        ]);
        table.to_string()
    }
}

/// Report the cursor and store counts.
pub async fn execute(_args: StatusArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = FileStore::new(&config.storage.root);
    if !store.exists().await? {
        return Err(DomainError::NotInitialized(format!(
            "{} (run `gitman init`)",
            config.storage.root.display()
        ))
        .into());
    }

    let status = StatusOutput {
        root: config.storage.root.clone(),
        cursor: store.load_cursor().await?,
        stats: store.stats().await?,
    };
    output(&status, json_mode);
    Ok(())
}

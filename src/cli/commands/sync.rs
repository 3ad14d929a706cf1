//! Implementation of the `gitman sync` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use serde::Serialize;

use crate::adapters::file_store::FileStore;
use crate::adapters::github::GitHubClient;
use crate::cli::output::progress::{create_spinner, ProgressBarExt};
use crate::cli::output::table::key_value_table;
use crate::cli::output::{output, CommandOutput};
use crate::cli::require_repo;
use crate::domain::errors::SyncResult;
use crate::domain::models::{Config, SingleSyncOutcome, StoreStats, SyncReport};
use crate::services::sync_service::SyncOrchestrator;

/// Sync issues, discussions and comments from GitHub
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("scope")
        .args(["issues_only", "discussions_only", "issue", "discussion"])
        .multiple(false)
))]
pub struct SyncArgs {
    /// Ignore the sync cursor and fetch everything
    #[arg(long)]
    pub full: bool,

    /// Only sync issues and issue comments
    #[arg(long)]
    pub issues_only: bool,

    /// Only sync discussions and discussion comments
    #[arg(long)]
    pub discussions_only: bool,

    /// Sync a single issue and its comments
    #[arg(long, value_name = "NUMBER")]
    pub issue: Option<u64>,

    /// Sync a single discussion and its comments
    #[arg(long, value_name = "NUMBER")]
    pub discussion: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// What a `gitman sync` invocation covers.
pub enum SyncScope {
    /// Every phase.
    All,
    /// Issues and issue comments.
    IssuesOnly,
    /// Discussions and discussion comments.
    DiscussionsOnly,
    /// One issue by number.
    Issue(u64),
    /// One discussion by number.
    Discussion(u64),
}

impl SyncArgs {
    /// Scope selected by the mutually exclusive flags.
    pub const fn scope(&self) -> SyncScope {
        if let Some(number) = self.issue {
            SyncScope::Issue(number)
        } else if let Some(number) = self.discussion {
            SyncScope::Discussion(number)
        } else if self.issues_only {
            SyncScope::IssuesOnly
        } else if self.discussions_only {
            SyncScope::DiscussionsOnly
        } else {
            SyncScope::All
        }
    }
}

#[derive(Debug, Serialize)]
/// Result of `gitman sync`.
pub struct SyncOutput {
    /// `owner/name`.
    pub repository: String,
    /// Requested scope.
    pub scope: SyncScope,
    /// The pass used the cursor's `since` watermarks.
    pub incremental: bool,
    /// Counts from a full pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SyncReport>,
    /// Outcome of a single-entity sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SingleSyncOutcome>,
    /// Store counts after the pass.
    pub stats: StoreStats,
}

impl CommandOutput for SyncOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();

        match (&self.outcome, self.scope) {
            (Some(SingleSyncOutcome::NotFound { number }), SyncScope::Discussion(_)) => {
                lines.push(format!("Discussion #{number} not found"));
            }
            (Some(SingleSyncOutcome::NotFound { number }), _) => {
                lines.push(format!("Issue #{number} not found"));
            }
            (Some(SingleSyncOutcome::Synced { number, comments }), _) => {
                lines.push(format!("Synced #{number} with {comments} comments"));
            }
            (None, _) => {}
        }

        if let Some(report) = &self.report {
            if report.pull_requests_skipped > 0 {
                lines.push(format!(
                    "Skipped {} pull requests",
                    report.pull_requests_skipped
                ));
            }
            if report.comments_dropped > 0 {
                lines.push(format!(
                    "Dropped {} comments with no owning issue",
                    report.comments_dropped
                ));
            }
        }

        lines.push(
            key_value_table([
                ("Issues", self.stats.issues.to_string()),
                ("Issue comments", self.stats.issue_comments.to_string()),
                ("Discussions", self.stats.discussions.to_string()),
                ("Discussion comments", self.stats.discussion_comments.to_string()),
            ])
            .to_string(),
        );
        lines.join("\n")
    }
}

/// Run the requested sync and print its report.
pub async fn execute(args: SyncArgs, config: &Config, json_mode: bool) -> Result<()> {
    let repo = require_repo(config)?;
    let client = GitHubClient::from_config(&config.github)?;
    let store = FileStore::new(&config.storage.root);
    if !store.exists().await? {
        store.init().await.context("Failed to initialize store")?;
    }

    let orchestrator = SyncOrchestrator::new(Arc::new(client), store, repo.clone());
    let scope = args.scope();
    let incremental = !args.full;

    let spinner = create_spinner(format!("Syncing {repo}..."), json_mode);
    let result = run(&orchestrator, scope, incremental).await;
    let (report, outcome) = match result {
        Ok(done) => {
            spinner.finish_success(format!("Synced {repo}"));
            done
        }
        Err(e) => {
            spinner.finish_error(format!("Sync of {repo} failed"));
            return Err(e.into());
        }
    };

    let stats = orchestrator.store().stats().await?;
    output(
        &SyncOutput {
            repository: repo.to_string(),
            scope,
            incremental,
            report,
            outcome,
            stats,
        },
        json_mode,
    );
    Ok(())
}

async fn run(
    orchestrator: &SyncOrchestrator,
    scope: SyncScope,
    incremental: bool,
) -> SyncResult<(Option<SyncReport>, Option<SingleSyncOutcome>)> {
    Ok(match scope {
        SyncScope::All => (Some(orchestrator.sync_all(incremental).await?), None),
        SyncScope::IssuesOnly => (Some(orchestrator.sync_issues(incremental).await?), None),
        SyncScope::DiscussionsOnly => {
            (Some(orchestrator.sync_discussions(incremental).await?), None)
        }
        SyncScope::Issue(number) => (None, Some(orchestrator.sync_specific_issue(number).await?)),
        SyncScope::Discussion(number) => (
            None,
            Some(orchestrator.sync_specific_discussion(number).await?),
        ),
    })
}

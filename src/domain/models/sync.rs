//! Sync cursor, phases and per-pass reporting.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted per-repository sync state (`sync_state.json`).
///
/// All timestamps are `null` until the first successful pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    /// Repository the cursor belongs to (`owner/repo`).
    #[serde(default)]
    pub repository: Option<String>,
    /// Last time any cursor field was written.
    #[serde(default, rename = "last_sync")]
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Start time of the last complete pass, used as `since` for issues.
    #[serde(default, rename = "issues_last_sync")]
    pub issues_last_sync_at: Option<DateTime<Utc>>,
    /// Start time of the last complete pass over discussions.
    #[serde(default, rename = "discussions_last_sync")]
    pub discussions_last_sync_at: Option<DateTime<Utc>>,
}

/// Partial cursor update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorUpdate {
    /// New `owner/name` stamp.
    pub repository: Option<String>,
    /// Completion time of an issues phase.
    pub issues_last_sync_at: Option<DateTime<Utc>>,
    /// Completion time of a discussions phase.
    pub discussions_last_sync_at: Option<DateTime<Utc>>,
}

impl SyncCursor {
    /// Merge an update into this cursor, stamping `last_sync_at` with `now`.
    ///
    /// Timestamps never move backwards.
    pub fn apply(&mut self, update: CursorUpdate, now: DateTime<Utc>) {
        if let Some(repository) = update.repository {
            self.repository = Some(repository);
        }
        self.issues_last_sync_at = later(self.issues_last_sync_at, update.issues_last_sync_at);
        self.discussions_last_sync_at =
            later(self.discussions_last_sync_at, update.discussions_last_sync_at);
        self.last_sync_at = later(self.last_sync_at, Some(now));
    }
}

fn later(current: Option<DateTime<Utc>>, new: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (current, new) {
        (Some(c), Some(n)) => Some(c.max(n)),
        (c, n) => n.or(c),
    }
}

/// The four ordered phases of a full pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPhase {
    /// Paginated issue listing.
    Issues,
    /// Repository-wide issue comment listing.
    IssueComments,
    /// Paginated discussion listing.
    Discussions,
    /// Per-discussion comment refresh.
    DiscussionComments,
}

impl SyncPhase {
    /// Phase name as shown in errors and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::IssueComments => "issue-comments",
            Self::Discussions => "discussions",
            Self::DiscussionComments => "discussion-comments",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts gathered during a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Issues written to the store.
    pub issues_saved: usize,
    /// Pull requests filtered out of the issue listing.
    pub pull_requests_skipped: usize,
    /// Issue comments written to the store.
    pub issue_comments_saved: usize,
    /// Comments whose owning issue could not be derived.
    pub comments_dropped: usize,
    /// Discussions written to the store.
    pub discussions_saved: usize,
    /// Discussion comments written to the store.
    pub discussion_comments_saved: usize,
    /// Local discussions whose comments were refreshed.
    pub discussions_scanned: usize,
}

/// Number of stored files per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Files under `issues/`.
    pub issues: usize,
    /// Files across every `issue_comments/<n>/` directory.
    pub issue_comments: usize,
    /// Files under `discussions/`.
    pub discussions: usize,
    /// Files across every `discussion_comments/<n>/` directory.
    pub discussion_comments: usize,
}

/// Outcome of a single-entity sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SingleSyncOutcome {
    /// The entity was saved along with this many comments.
    Synced {
        /// Issue or discussion number.
        number: u64,
        /// Comments saved.
        comments: usize,
    },
    /// No entity with that number exists remotely.
    NotFound {
        /// Number that was requested.
        number: u64,
    },
}

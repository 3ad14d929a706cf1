//! Sync orchestrator.
//!
//! Brings a [`FileStore`] up to date with a [`RemoteClient`] for one
//! repository in four ordered phases: issues, issue comments, discussions,
//! discussion comments. The cursor only advances after all four succeed.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::adapters::file_store::FileStore;
use crate::domain::errors::{DomainError, DomainResult, SyncError, SyncResult};
use crate::domain::models::entity::{
    is_pull_request, issue_number_from_comment, sequence_number,
};
use crate::domain::models::{
    CommentKind, CursorUpdate, EntityKind, RemoteId, RepoRef, SingleSyncOutcome, SyncPhase,
    SyncReport,
};
use crate::domain::ports::{IssueState, Page, PageToken, RemoteClient};

/// Drain a paginated endpoint, starting from the first page.
///
/// `fetch` receives the continuation token of the previous page (`None` for
/// the first call) and must return the next page.
pub async fn collect_pages<F, Fut>(mut fetch: F) -> DomainResult<Vec<Value>>
where
    F: FnMut(Option<PageToken>) -> Fut,
    Fut: Future<Output = DomainResult<Page>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);
        match page.next {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }
}

/// Synchronizes one repository into a local store.
pub struct SyncOrchestrator {
    client: Arc<dyn RemoteClient>,
    store: FileStore,
    repo: RepoRef,
}

impl SyncOrchestrator {
    /// Build an orchestrator for `repo` over the given client and store.
    pub fn new(client: Arc<dyn RemoteClient>, store: FileStore, repo: RepoRef) -> Self {
        Self { client, store, repo }
    }

    /// Repository this orchestrator syncs.
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Backing store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Run all four phases, then advance the cursor.
    ///
    /// With `incremental`, issues and issue comments are requested since the
    /// stored issues cursor. Discussions are always fetched in full. The new
    /// cursor value is the time the pass started, so anything updated while
    /// the pass runs is fetched again next time.
    pub async fn sync_all(&self, incremental: bool) -> SyncResult<SyncReport> {
        let started_at = Utc::now();
        tracing::info!(repository = %self.repo, incremental, "starting sync");

        let since = self.issues_since(incremental).await?;
        let mut report = SyncReport::default();

        self.run_phase(SyncPhase::Issues, self.fetch_issues(since, &mut report))
            .await?;
        self.run_phase(
            SyncPhase::IssueComments,
            self.fetch_issue_comments(since, &mut report),
        )
        .await?;
        self.run_phase(SyncPhase::Discussions, self.fetch_discussions(&mut report))
            .await?;
        self.run_phase(
            SyncPhase::DiscussionComments,
            self.fetch_discussion_comments(&mut report),
        )
        .await?;

        self.store
            .update_cursor(CursorUpdate {
                repository: Some(self.repo.to_string()),
                issues_last_sync_at: Some(started_at),
                discussions_last_sync_at: Some(started_at),
            })
            .await
            .map_err(|source| self.cursor_failed(source))?;

        tracing::info!(repository = %self.repo, ?report, "sync complete");
        Ok(report)
    }

    /// Issues and issue comments only. The cursor is left untouched.
    pub async fn sync_issues(&self, incremental: bool) -> SyncResult<SyncReport> {
        let since = self.issues_since(incremental).await?;
        let mut report = SyncReport::default();
        self.run_phase(SyncPhase::Issues, self.fetch_issues(since, &mut report))
            .await?;
        self.run_phase(
            SyncPhase::IssueComments,
            self.fetch_issue_comments(since, &mut report),
        )
        .await?;
        Ok(report)
    }

    /// Discussions and discussion comments only. The cursor is left untouched.
    ///
    /// There is no server-side `since` filter for discussions, so the
    /// `incremental` flag has no effect on what is fetched.
    pub async fn sync_discussions(&self, incremental: bool) -> SyncResult<SyncReport> {
        if incremental {
            tracing::debug!(
                repository = %self.repo,
                "discussions have no since filter, fetching all"
            );
        }
        let mut report = SyncReport::default();
        self.run_phase(SyncPhase::Discussions, self.fetch_discussions(&mut report))
            .await?;
        self.run_phase(
            SyncPhase::DiscussionComments,
            self.fetch_discussion_comments(&mut report),
        )
        .await?;
        Ok(report)
    }

    /// Sync one issue and its comments.
    ///
    /// A pull request with that number is reported as not found.
    pub async fn sync_specific_issue(&self, number: u64) -> SyncResult<SingleSyncOutcome> {
        let issue = self
            .run_phase(SyncPhase::Issues, async {
                let issues = self.list_issues(None).await?;
                Ok(issues.into_iter().find(|issue| {
                    sequence_number(issue) == Some(number) && !is_pull_request(issue)
                }))
            })
            .await?;

        let Some(issue) = issue else {
            tracing::warn!(repository = %self.repo, number, "issue not found");
            return Ok(SingleSyncOutcome::NotFound { number });
        };

        self.run_phase(SyncPhase::Issues, async {
            self.store.save_entity(EntityKind::Issue, number, &issue).await
        })
        .await?;

        let comments = self
            .run_phase(SyncPhase::IssueComments, async {
                let client = &self.client;
                let repo = &self.repo;
                let comments = collect_pages(|token| async move {
                    client
                        .comments_for_issue_page(repo, number, token.as_ref())
                        .await
                })
                .await?;
                self.save_comments(CommentKind::Issue, number, &comments).await
            })
            .await?;

        tracing::info!(repository = %self.repo, number, comments, "synced issue");
        Ok(SingleSyncOutcome::Synced { number, comments })
    }

    /// Sync one discussion and its comments.
    pub async fn sync_specific_discussion(&self, number: u64) -> SyncResult<SingleSyncOutcome> {
        let discussion = self
            .run_phase(SyncPhase::Discussions, async {
                let discussions = self.list_discussions().await?;
                Ok(discussions
                    .into_iter()
                    .find(|d| sequence_number(d) == Some(number)))
            })
            .await?;

        let Some(discussion) = discussion else {
            tracing::warn!(repository = %self.repo, number, "discussion not found");
            return Ok(SingleSyncOutcome::NotFound { number });
        };

        self.run_phase(SyncPhase::Discussions, async {
            self.store
                .save_entity(EntityKind::Discussion, number, &discussion)
                .await
        })
        .await?;

        let comments = self
            .run_phase(SyncPhase::DiscussionComments, async {
                let comments = self.list_discussion_comments(number).await?;
                self.save_comments(CommentKind::Discussion, number, &comments)
                    .await
            })
            .await?;

        tracing::info!(repository = %self.repo, number, comments, "synced discussion");
        Ok(SingleSyncOutcome::Synced { number, comments })
    }

    // ── Phases ──────────────────────────────────────────────────────────────

    async fn fetch_issues(
        &self,
        since: Option<DateTime<Utc>>,
        report: &mut SyncReport,
    ) -> DomainResult<()> {
        for issue in self.list_issues(since).await? {
            if is_pull_request(&issue) {
                report.pull_requests_skipped += 1;
                continue;
            }
            let Some(number) = sequence_number(&issue) else {
                tracing::warn!(repository = %self.repo, "issue without a number, skipping");
                continue;
            };
            self.store.save_entity(EntityKind::Issue, number, &issue).await?;
            report.issues_saved += 1;
        }

        tracing::info!(
            repository = %self.repo,
            saved = report.issues_saved,
            pull_requests_skipped = report.pull_requests_skipped,
            "issues synced"
        );
        Ok(())
    }

    async fn fetch_issue_comments(
        &self,
        since: Option<DateTime<Utc>>,
        report: &mut SyncReport,
    ) -> DomainResult<()> {
        let client = &self.client;
        let repo = &self.repo;
        let comments = collect_pages(|token| async move {
            client.issue_comments_page(repo, since, token.as_ref()).await
        })
        .await?;

        for comment in comments {
            let linkage = issue_number_from_comment(&comment).zip(RemoteId::from_payload(&comment));
            let Some((issue_number, comment_id)) = linkage else {
                tracing::warn!(
                    repository = %self.repo,
                    comment_id = ?comment.get("id"),
                    issue_url = ?comment.get("issue_url"),
                    "cannot derive owning issue for comment, dropping"
                );
                report.comments_dropped += 1;
                continue;
            };
            self.store
                .save_comment(CommentKind::Issue, issue_number, &comment_id, &comment)
                .await?;
            report.issue_comments_saved += 1;
        }

        tracing::info!(
            repository = %self.repo,
            saved = report.issue_comments_saved,
            dropped = report.comments_dropped,
            "issue comments synced"
        );
        Ok(())
    }

    async fn fetch_discussions(&self, report: &mut SyncReport) -> DomainResult<()> {
        for discussion in self.list_discussions().await? {
            let Some(number) = sequence_number(&discussion) else {
                tracing::warn!(repository = %self.repo, "discussion without a number, skipping");
                continue;
            };
            self.store
                .save_entity(EntityKind::Discussion, number, &discussion)
                .await?;
            report.discussions_saved += 1;
        }

        tracing::info!(
            repository = %self.repo,
            saved = report.discussions_saved,
            "discussions synced"
        );
        Ok(())
    }

    /// Refresh comments for every discussion held locally, not only the ones
    /// fetched in this pass.
    async fn fetch_discussion_comments(&self, report: &mut SyncReport) -> DomainResult<()> {
        let mut numbers = self.store.list_keys(EntityKind::Discussion).await?;
        numbers.sort_unstable();

        for number in &numbers {
            let comments = self.list_discussion_comments(*number).await?;
            report.discussion_comments_saved += self
                .save_comments(CommentKind::Discussion, *number, &comments)
                .await?;
        }
        report.discussions_scanned = numbers.len();

        tracing::info!(
            repository = %self.repo,
            saved = report.discussion_comments_saved,
            discussions = report.discussions_scanned,
            "discussion comments synced"
        );
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    async fn list_issues(&self, since: Option<DateTime<Utc>>) -> DomainResult<Vec<Value>> {
        let client = &self.client;
        let repo = &self.repo;
        collect_pages(|token| async move {
            client
                .issues_page(repo, IssueState::All, since, token.as_ref())
                .await
        })
        .await
    }

    async fn list_discussions(&self) -> DomainResult<Vec<Value>> {
        let client = &self.client;
        let repo = &self.repo;
        collect_pages(|token| async move { client.discussions_page(repo, token.as_ref()).await })
            .await
    }

    async fn list_discussion_comments(&self, number: u64) -> DomainResult<Vec<Value>> {
        let client = &self.client;
        let repo = &self.repo;
        collect_pages(|token| async move {
            client
                .discussion_comments_page(repo, number, token.as_ref())
                .await
        })
        .await
    }

    /// Save comments under a known parent. Comments without an id are skipped.
    async fn save_comments(
        &self,
        kind: CommentKind,
        parent: u64,
        comments: &[Value],
    ) -> DomainResult<usize> {
        let mut saved = 0;
        for comment in comments {
            let Some(id) = RemoteId::from_payload(comment) else {
                tracing::warn!(repository = %self.repo, parent, "comment without an id, skipping");
                continue;
            };
            self.store.save_comment(kind, parent, &id, comment).await?;
            saved += 1;
        }
        Ok(saved)
    }

    async fn issues_since(&self, incremental: bool) -> SyncResult<Option<DateTime<Utc>>> {
        if !incremental {
            return Ok(None);
        }
        let cursor = self
            .store
            .load_cursor()
            .await
            .map_err(|source| self.cursor_failed(source))?;
        Ok(cursor.issues_last_sync_at)
    }

    async fn run_phase<T>(
        &self,
        phase: SyncPhase,
        work: impl Future<Output = DomainResult<T>>,
    ) -> SyncResult<T> {
        tracing::debug!(repository = %self.repo, %phase, "phase started");
        work.await.map_err(|source| {
            tracing::error!(repository = %self.repo, %phase, error = %source, "phase failed");
            SyncError::PhaseFailed {
                phase,
                repository: self.repo.to_string(),
                source,
            }
        })
    }

    fn cursor_failed(&self, source: DomainError) -> SyncError {
        SyncError::Cursor {
            repository: self.repo.to_string(),
            source,
        }
    }
}

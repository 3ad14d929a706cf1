//! Common test utilities for integration tests
//!
//! An in-memory [`RemoteClient`], raw GitHub API payload builders and
//! webhook fixtures shared across the integration test files.

#![allow(dead_code)]

pub mod webhooks;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

use gitman::domain::errors::{DomainError, DomainResult};
use gitman::domain::models::{RepoRef, SyncPhase};
use gitman::domain::ports::{IssueState, Page, PageToken, RemoteClient};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn repo() -> RepoRef {
    RepoRef::new("octo", "widgets")
}

/// In-memory remote serving fixed data in pages of `page_size`.
///
/// Page tokens are the offset of the next item. `fail_on` makes every
/// request belonging to that phase fail with a remote error.
pub struct FakeRemoteClient {
    pub issues: Vec<Value>,
    pub issue_comments: Vec<Value>,
    pub comments_by_issue: HashMap<u64, Vec<Value>>,
    pub discussions: Vec<Value>,
    pub discussion_comments: HashMap<u64, Vec<Value>>,
    pub page_size: usize,
    pub fail_on: Option<SyncPhase>,
    pub issue_since: Mutex<Vec<Option<DateTime<Utc>>>>,
    pub requests: Mutex<Vec<&'static str>>,
}

impl Default for FakeRemoteClient {
    fn default() -> Self {
        Self {
            issues: Vec::new(),
            issue_comments: Vec::new(),
            comments_by_issue: HashMap::new(),
            discussions: Vec::new(),
            discussion_comments: HashMap::new(),
            page_size: 2,
            fail_on: None,
            issue_since: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRemoteClient {
    pub fn request_count(&self, endpoint: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| **r == endpoint)
            .count()
    }

    fn serve(
        &self,
        endpoint: &'static str,
        phase: SyncPhase,
        items: &[Value],
        token: Option<&PageToken>,
    ) -> DomainResult<Page> {
        self.requests.lock().unwrap().push(endpoint);
        if self.fail_on == Some(phase) {
            return Err(DomainError::Remote(format!("{endpoint} returned 502 Bad Gateway")));
        }

        let start: usize = token.map_or(0, |t| t.0.parse().unwrap());
        let end = (start + self.page_size.max(1)).min(items.len());
        let next = (end < items.len()).then(|| PageToken(end.to_string()));
        Ok(Page {
            items: items[start..end].to_vec(),
            next,
        })
    }
}

#[async_trait]
impl RemoteClient for FakeRemoteClient {
    async fn issues_page(
        &self,
        _repo: &RepoRef,
        _state: IssueState,
        since: Option<DateTime<Utc>>,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        if page.is_none() {
            self.issue_since.lock().unwrap().push(since);
        }
        self.serve("issues", SyncPhase::Issues, &self.issues, page)
    }

    async fn issue_comments_page(
        &self,
        _repo: &RepoRef,
        _since: Option<DateTime<Utc>>,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        self.serve(
            "issue_comments",
            SyncPhase::IssueComments,
            &self.issue_comments,
            page,
        )
    }

    async fn comments_for_issue_page(
        &self,
        _repo: &RepoRef,
        issue_number: u64,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let comments = self
            .comments_by_issue
            .get(&issue_number)
            .cloned()
            .unwrap_or_default();
        self.serve("comments_for_issue", SyncPhase::IssueComments, &comments, page)
    }

    async fn discussions_page(
        &self,
        _repo: &RepoRef,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        self.serve("discussions", SyncPhase::Discussions, &self.discussions, page)
    }

    async fn discussion_comments_page(
        &self,
        _repo: &RepoRef,
        discussion_number: u64,
        page: Option<&PageToken>,
    ) -> DomainResult<Page> {
        let comments = self
            .discussion_comments
            .get(&discussion_number)
            .cloned()
            .unwrap_or_default();
        self.serve(
            "discussion_comments",
            SyncPhase::DiscussionComments,
            &comments,
            page,
        )
    }
}

// ── REST / GraphQL payloads ─────────────────────────────────────────────────

pub fn issue(number: u64) -> Value {
    json!({
        "id": 1_000 + number,
        "number": number,
        "title": format!("Issue {number}"),
        "state": "open",
        "url": format!("https://api.github.com/repos/octo/widgets/issues/{number}"),
        "updated_at": "2024-01-15T10:30:00Z",
        "user": {"login": "hubot", "id": 1},
        "labels": [],
    })
}

pub fn pull_request(number: u64) -> Value {
    let mut pr = issue(number);
    pr["pull_request"] = json!({
        "url": format!("https://api.github.com/repos/octo/widgets/pulls/{number}"),
    });
    pr
}

pub fn issue_comment(id: u64, issue_number: u64) -> Value {
    json!({
        "id": id,
        "body": format!("comment {id}"),
        "issue_url": format!("https://api.github.com/repos/octo/widgets/issues/{issue_number}"),
        "user": {"login": "hubot", "id": 1},
        "updated_at": "2024-01-15T10:31:00Z",
    })
}

pub fn discussion(number: u64) -> Value {
    json!({
        "id": format!("D_kwDO{number}"),
        "number": number,
        "title": format!("Discussion {number}"),
        "updatedAt": "2024-01-15T10:30:00Z",
        "author": {"login": "hubot"},
        "category": {"name": "General"},
    })
}

pub fn discussion_comment(id: &str) -> Value {
    json!({
        "id": id,
        "body": "thanks!",
        "author": {"login": "hubot"},
        "isAnswer": false,
        "replies": {"nodes": []},
    })
}

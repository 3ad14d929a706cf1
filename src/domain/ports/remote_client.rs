//! Remote tracker port.
//!
//! The sync orchestrator talks to the remote exclusively through this trait.
//! Each method fetches exactly one page; the caller drives pagination by
//! handing back the continuation token it received. Retry, backoff and
//! rate-limit waits are the implementation's business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::errors::DomainResult;
use crate::domain::models::RepoRef;

/// Opaque continuation token.
///
/// REST implementations typically store the next-page URL, GraphQL ones the
/// `endCursor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken(pub String);

/// One page of raw payloads plus the token for the next page, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Raw item payloads, in remote order.
    pub items: Vec<Value>,
    /// Token for the following page; `None` on the last one.
    pub next: Option<PageToken>,
}

impl Page {
    /// A terminal page.
    pub fn last(items: Vec<Value>) -> Self {
        Self { items, next: None }
    }
}

/// Issue state filter for [`RemoteClient::issues_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    /// Open issues only.
    Open,
    /// Closed issues only.
    Closed,
    /// Both.
    All,
}

impl IssueState {
    /// Query-string value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Port for fetching issues, discussions and their comments.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// One page of issues. May include pull requests; callers filter them.
    async fn issues_page(
        &self,
        repo: &RepoRef,
        state: IssueState,
        since: Option<DateTime<Utc>>,
        page: Option<&PageToken>,
    ) -> DomainResult<Page>;

    /// One page of the repository-wide issue comment feed.
    async fn issue_comments_page(
        &self,
        repo: &RepoRef,
        since: Option<DateTime<Utc>>,
        page: Option<&PageToken>,
    ) -> DomainResult<Page>;

    /// One page of comments on a single issue.
    async fn comments_for_issue_page(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        page: Option<&PageToken>,
    ) -> DomainResult<Page>;

    /// One page of discussions. There is no server-side `since` filter.
    async fn discussions_page(
        &self,
        repo: &RepoRef,
        page: Option<&PageToken>,
    ) -> DomainResult<Page>;

    /// One page of comments on a single discussion.
    async fn discussion_comments_page(
        &self,
        repo: &RepoRef,
        discussion_number: u64,
        page: Option<&PageToken>,
    ) -> DomainResult<Page>;
}

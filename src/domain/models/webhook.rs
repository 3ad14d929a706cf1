//! Typed GitHub webhook events.
//!
//! These structs map to the webhook JSON payloads GitHub delivers. Every
//! non-`Option` field is required: deserializing a payload that lacks one
//! fails, which is how the classifier tells "known event, drifted payload"
//! apart from "unknown event". Unknown extra fields are ignored.

// Field names mirror GitHub's payload schema.
#![allow(missing_docs)]

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Shared sub-objects ──────────────────────────────────────────────────────

/// A GitHub user or bot account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub id: u64,
    pub node_id: String,
    pub avatar_url: String,
    pub html_url: String,
    /// `User`, `Bot` or `Organization`.
    #[serde(rename = "type")]
    pub account_type: String,
    pub site_admin: bool,
}

/// The repository an event belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
    pub private: bool,
    pub owner: User,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fork: bool,
    pub url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Repository reference embedded inside a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalRepository {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
    pub private: bool,
    pub owner: User,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fork: bool,
    pub url: String,
}

/// An issue or discussion label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: u64,
    pub node_id: String,
    pub url: String,
    pub name: String,
    pub color: String,
    pub default: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// A GitHub App.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: u64,
    #[serde(default)]
    pub slug: Option<String>,
    pub node_id: String,
    pub owner: User,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub permissions: serde_json::Map<String, Value>,
    #[serde(default)]
    pub events: Vec<String>,
}

/// Organisation attached to org-owned repository events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub login: String,
    pub id: u64,
    pub node_id: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Content objects ─────────────────────────────────────────────────────────

/// An issue as embedded in issue and issue-comment events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub url: String,
    pub repository_url: String,
    pub html_url: String,
    pub id: u64,
    pub node_id: String,
    pub number: u64,
    pub title: String,
    pub user: User,
    pub labels: Vec<Label>,
    pub state: String,
    pub locked: bool,
    #[serde(default)]
    pub assignee: Option<User>,
    pub assignees: Vec<User>,
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    pub author_association: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state_reason: Option<String>,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub url: String,
    pub html_url: String,
    pub issue_url: String,
    pub id: u64,
    pub node_id: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_association: String,
    pub body: String,
}

/// Discussion category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub node_id: String,
    pub repository_id: u64,
    pub emoji: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
    pub is_answerable: bool,
}

/// A discussion as embedded in discussion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub repository_url: String,
    pub category: Category,
    #[serde(default)]
    pub answer_html_url: Option<String>,
    #[serde(default)]
    pub answer_chosen_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub id: u64,
    pub node_id: String,
    pub number: u64,
    pub title: String,
    pub user: User,
    pub state: String,
    pub locked: bool,
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_association: String,
    #[serde(default)]
    pub body: Option<String>,
}

// ── CI objects ──────────────────────────────────────────────────────────────

/// Check suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSuite {
    pub id: u64,
    pub node_id: String,
    #[serde(default)]
    pub head_branch: Option<String>,
    pub head_sha: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub url: String,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    pub pull_requests: Vec<Value>,
    pub app: App,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Output block of a check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRunOutput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub annotations_count: u64,
    pub annotations_url: String,
}

/// Check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRun {
    pub id: u64,
    pub name: String,
    pub node_id: String,
    pub head_sha: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub url: String,
    pub html_url: String,
    #[serde(default)]
    pub details_url: Option<String>,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub output: CheckRunOutput,
    pub check_suite: CheckSuite,
}

/// A single step of a workflow job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub number: u64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Workflow job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowJob {
    pub id: u64,
    pub run_id: u64,
    pub workflow_name: String,
    pub head_branch: String,
    pub run_url: String,
    pub run_attempt: u64,
    pub node_id: String,
    pub head_sha: String,
    pub url: String,
    pub html_url: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub name: String,
    pub steps: Vec<WorkflowStep>,
    pub check_run_url: String,
    pub labels: Vec<String>,
    #[serde(default)]
    pub runner_id: Option<u64>,
    #[serde(default)]
    pub runner_name: Option<String>,
    #[serde(default)]
    pub runner_group_id: Option<u64>,
    #[serde(default)]
    pub runner_group_name: Option<String>,
}

/// Workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub path: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    pub html_url: String,
    pub badge_url: String,
}

/// Workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub name: String,
    pub node_id: String,
    pub head_branch: String,
    pub head_sha: String,
    pub path: String,
    pub display_title: String,
    pub run_number: u64,
    pub event: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub workflow_id: u64,
    pub check_suite_id: u64,
    pub check_suite_node_id: String,
    pub url: String,
    pub html_url: String,
    pub pull_requests: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub actor: User,
    pub run_attempt: u64,
    pub run_started_at: DateTime<Utc>,
    pub triggering_actor: User,
    pub jobs_url: String,
    pub logs_url: String,
    pub check_suite_url: String,
    pub artifacts_url: String,
    pub cancel_url: String,
    pub rerun_url: String,
    #[serde(default)]
    pub previous_attempt_url: Option<String>,
    pub workflow_url: String,
    pub head_commit: Value,
    pub repository: MinimalRepository,
    pub head_repository: MinimalRepository,
}

// ── Push objects ────────────────────────────────────────────────────────────

/// Person who pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pusher {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Git author or committer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// A commit listed in a push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub tree_id: String,
    pub distinct: bool,
    pub message: String,
    /// Git timestamps keep the committer's offset.
    pub timestamp: DateTime<FixedOffset>,
    pub url: String,
    pub author: CommitAuthor,
    pub committer: CommitAuthor,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

// ── Event payloads ──────────────────────────────────────────────────────────

/// `discussion` event (created, pinned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionEvent {
    pub action: String,
    pub discussion: Discussion,
    pub repository: Repository,
    pub sender: User,
}

/// `issues` event with action `opened`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueOpenedEvent {
    pub action: String,
    pub issue: Issue,
    pub repository: Repository,
    pub sender: User,
    #[serde(default)]
    pub organization: Option<Organization>,
}

/// `issue_comment` event with action `created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueCommentCreatedEvent {
    pub action: String,
    pub issue: Issue,
    pub comment: Comment,
    pub repository: Repository,
    pub sender: User,
    #[serde(default)]
    pub organization: Option<Organization>,
}

/// `issues` event with action `labeled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuesLabeledEvent {
    pub action: String,
    pub issue: Issue,
    pub label: Label,
    pub repository: Repository,
    pub sender: User,
}

/// `check_run` event (created, completed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRunEvent {
    pub action: String,
    pub check_run: CheckRun,
    pub repository: Repository,
    pub sender: User,
    #[serde(default)]
    pub app: Option<App>,
}

/// `check_suite` event with action `completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSuiteCompletedEvent {
    pub action: String,
    pub check_suite: CheckSuite,
    pub repository: Repository,
    pub sender: User,
}

/// `workflow_job` event (any action).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowJobEvent {
    pub action: String,
    pub workflow_job: WorkflowJob,
    pub repository: Repository,
    pub sender: User,
}

/// `workflow_run` event (any action).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunEvent {
    pub action: String,
    pub workflow_run: WorkflowRun,
    pub workflow: Workflow,
    pub repository: Repository,
    pub sender: User,
}

/// `push` event. Pushes carry no `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub before: String,
    pub after: String,
    pub repository: Repository,
    pub pusher: Pusher,
    pub sender: User,
    pub created: bool,
    pub deleted: bool,
    pub forced: bool,
    #[serde(default)]
    pub base_ref: Option<String>,
    pub compare: String,
    pub commits: Vec<Commit>,
    /// Null when a branch is deleted.
    #[serde(default)]
    pub head_commit: Option<Commit>,
}

// ── The closed event set ────────────────────────────────────────────────────

/// Discriminant of [`WebhookEvent`], used where no payload is at hand
/// (for example in validation errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WebhookEventKind {
    DiscussionCreated,
    DiscussionPinned,
    IssueOpened,
    IssueCommentCreated,
    IssuesLabeled,
    CheckRunCreated,
    CheckRunCompleted,
    CheckSuiteCompleted,
    WorkflowJobEvent,
    WorkflowRunEvent,
    PushEvent,
}

impl WebhookEventKind {
    /// Every kind, in classification priority order.
    pub const ALL: [Self; 11] = [
        Self::DiscussionCreated,
        Self::DiscussionPinned,
        Self::IssueCommentCreated,
        Self::IssueOpened,
        Self::IssuesLabeled,
        Self::CheckRunCreated,
        Self::CheckRunCompleted,
        Self::CheckSuiteCompleted,
        Self::WorkflowJobEvent,
        Self::WorkflowRunEvent,
        Self::PushEvent,
    ];

    /// Variant name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DiscussionCreated => "DiscussionCreated",
            Self::DiscussionPinned => "DiscussionPinned",
            Self::IssueOpened => "IssueOpened",
            Self::IssueCommentCreated => "IssueCommentCreated",
            Self::IssuesLabeled => "IssuesLabeled",
            Self::CheckRunCreated => "CheckRunCreated",
            Self::CheckRunCompleted => "CheckRunCompleted",
            Self::CheckSuiteCompleted => "CheckSuiteCompleted",
            Self::WorkflowJobEvent => "WorkflowJobEvent",
            Self::WorkflowRunEvent => "WorkflowRunEvent",
            Self::PushEvent => "PushEvent",
        }
    }
}

impl fmt::Display for WebhookEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A webhook payload resolved to exactly one known event.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    DiscussionCreated(DiscussionEvent),
    DiscussionPinned(DiscussionEvent),
    IssueOpened(IssueOpenedEvent),
    IssueCommentCreated(IssueCommentCreatedEvent),
    IssuesLabeled(IssuesLabeledEvent),
    CheckRunCreated(CheckRunEvent),
    CheckRunCompleted(CheckRunEvent),
    CheckSuiteCompleted(CheckSuiteCompletedEvent),
    WorkflowJobEvent(WorkflowJobEvent),
    WorkflowRunEvent(WorkflowRunEvent),
    PushEvent(PushEvent),
}

impl WebhookEvent {
    /// The discriminant of this event.
    pub const fn kind(&self) -> WebhookEventKind {
        match self {
            Self::DiscussionCreated(_) => WebhookEventKind::DiscussionCreated,
            Self::DiscussionPinned(_) => WebhookEventKind::DiscussionPinned,
            Self::IssueOpened(_) => WebhookEventKind::IssueOpened,
            Self::IssueCommentCreated(_) => WebhookEventKind::IssueCommentCreated,
            Self::IssuesLabeled(_) => WebhookEventKind::IssuesLabeled,
            Self::CheckRunCreated(_) => WebhookEventKind::CheckRunCreated,
            Self::CheckRunCompleted(_) => WebhookEventKind::CheckRunCompleted,
            Self::CheckSuiteCompleted(_) => WebhookEventKind::CheckSuiteCompleted,
            Self::WorkflowJobEvent(_) => WebhookEventKind::WorkflowJobEvent,
            Self::WorkflowRunEvent(_) => WebhookEventKind::WorkflowRunEvent,
            Self::PushEvent(_) => WebhookEventKind::PushEvent,
        }
    }

    /// The `action` field; `None` for pushes.
    pub fn action(&self) -> Option<&str> {
        let action = match self {
            Self::DiscussionCreated(e) | Self::DiscussionPinned(e) => &e.action,
            Self::IssueOpened(e) => &e.action,
            Self::IssueCommentCreated(e) => &e.action,
            Self::IssuesLabeled(e) => &e.action,
            Self::CheckRunCreated(e) | Self::CheckRunCompleted(e) => &e.action,
            Self::CheckSuiteCompleted(e) => &e.action,
            Self::WorkflowJobEvent(e) => &e.action,
            Self::WorkflowRunEvent(e) => &e.action,
            Self::PushEvent(_) => return None,
        };
        Some(action.as_str())
    }

    /// Repository the event belongs to.
    pub fn repository(&self) -> &Repository {
        match self {
            Self::DiscussionCreated(e) | Self::DiscussionPinned(e) => &e.repository,
            Self::IssueOpened(e) => &e.repository,
            Self::IssueCommentCreated(e) => &e.repository,
            Self::IssuesLabeled(e) => &e.repository,
            Self::CheckRunCreated(e) | Self::CheckRunCompleted(e) => &e.repository,
            Self::CheckSuiteCompleted(e) => &e.repository,
            Self::WorkflowJobEvent(e) => &e.repository,
            Self::WorkflowRunEvent(e) => &e.repository,
            Self::PushEvent(e) => &e.repository,
        }
    }

    /// Account that triggered the event.
    pub fn sender(&self) -> &User {
        match self {
            Self::DiscussionCreated(e) | Self::DiscussionPinned(e) => &e.sender,
            Self::IssueOpened(e) => &e.sender,
            Self::IssueCommentCreated(e) => &e.sender,
            Self::IssuesLabeled(e) => &e.sender,
            Self::CheckRunCreated(e) | Self::CheckRunCompleted(e) => &e.sender,
            Self::CheckSuiteCompleted(e) => &e.sender,
            Self::WorkflowJobEvent(e) => &e.sender,
            Self::WorkflowRunEvent(e) => &e.sender,
            Self::PushEvent(e) => &e.sender,
        }
    }

    /// One-line description for logs and the CLI.
    pub fn summary(&self) -> String {
        match self {
            Self::DiscussionCreated(e) | Self::DiscussionPinned(e) => {
                format!("#{} '{}'", e.discussion.number, e.discussion.title)
            }
            Self::IssueOpened(e) => format!("#{} '{}'", e.issue.number, e.issue.title),
            Self::IssueCommentCreated(e) => {
                format!("#{} '{}' comment {}", e.issue.number, e.issue.title, e.comment.id)
            }
            Self::IssuesLabeled(e) => {
                format!("#{} '{}' +{}", e.issue.number, e.issue.title, e.label.name)
            }
            Self::CheckRunCreated(e) | Self::CheckRunCompleted(e) => {
                format!("'{}' -> {}", e.check_run.name, e.check_run.status)
            }
            Self::CheckSuiteCompleted(e) => format!(
                "suite {} -> {}",
                e.check_suite.id,
                e.check_suite.conclusion.as_deref().unwrap_or("none")
            ),
            Self::WorkflowJobEvent(e) => {
                format!("'{}' -> {}", e.workflow_job.name, e.workflow_job.status)
            }
            Self::WorkflowRunEvent(e) => {
                format!("'{}' -> {}", e.workflow_run.name, e.workflow_run.status)
            }
            Self::PushEvent(e) => {
                let n = e.commits.len();
                format!("{} {n} commit{}", e.git_ref, if n == 1 { "" } else { "s" })
            }
        }
    }
}

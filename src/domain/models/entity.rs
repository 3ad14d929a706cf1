//! Entities mirrored from the remote tracker.
//!
//! Payloads are kept as the raw JSON the remote returned; this module only
//! knows how to pull the few fields the store needs to name files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::DomainError;

/// Top-level entity kinds stored one file per sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A repository issue (pull requests excluded).
    Issue,
    /// A repository discussion.
    Discussion,
}

impl EntityKind {
    /// Directory name under the store root.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::Discussion => "discussions",
        }
    }

    /// The comment kind nested under this entity.
    pub const fn comments(self) -> CommentKind {
        match self {
            Self::Issue => CommentKind::Issue,
            Self::Discussion => CommentKind::Discussion,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::Discussion => write!(f, "discussion"),
        }
    }
}

/// Comment kinds, stored per parent under `<dir>/<parent_number>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// Comment on an issue (REST, integer ids).
    Issue,
    /// Comment on a discussion (GraphQL, node ids).
    Discussion,
}

impl CommentKind {
    /// Directory name under the store root.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Issue => "issue_comments",
            Self::Discussion => "discussion_comments",
        }
    }
}

/// Repository identity, `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// User or organisation owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoRef {
    /// Build a repository reference from its two halves.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(DomainError::ValidationFailed(format!(
                "invalid repository '{s}', expected owner/repo"
            ))),
        }
    }
}

/// Stable identifier assigned by the remote.
///
/// REST resources use integers, GraphQL resources use opaque node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    /// Integer id (REST API).
    Number(u64),
    /// Opaque node id (GraphQL API).
    Node(String),
}

impl RemoteId {
    /// Read the `id` field of a payload.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        match payload.get("id")? {
            Value::Number(n) => n.as_u64().map(Self::Number),
            Value::String(s) if !s.is_empty() => Some(Self::Node(s.clone())),
            _ => None,
        }
    }

    /// File stem for this id, with path-hostile characters replaced.
    pub fn file_stem(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Node(s) => sanitize_id(s),
        }
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Node(s) => write!(f, "{s}"),
        }
    }
}

/// Replace `:` and `/` so a node id is safe as a file name.
pub fn sanitize_id(id: &str) -> String {
    id.replace([':', '/'], "_")
}

/// Read the human-facing `number` of an issue or discussion payload.
pub fn sequence_number(payload: &Value) -> Option<u64> {
    payload.get("number").and_then(Value::as_u64)
}

/// True when an issue-shaped record is actually a pull request.
///
/// The issues endpoint returns pull requests too; they carry a non-null
/// `pull_request` object.
pub fn is_pull_request(payload: &Value) -> bool {
    payload.get("pull_request").is_some_and(|pr| !pr.is_null())
}

/// Derive the owning issue number from a comment's `issue_url`.
///
/// Accepts both `.../repos/o/r/issues/42` and a comment url of the form
/// `.../repos/o/r/issues/42/comments/99`. Returns `None` when the field is
/// missing or no issue segment can be found.
pub fn issue_number_from_comment(comment: &Value) -> Option<u64> {
    comment
        .get("issue_url")
        .and_then(Value::as_str)
        .and_then(issue_number_from_url)
}

/// Extract the number following the last `issues/` path segment.
pub fn issue_number_from_url(url: &str) -> Option<u64> {
    let segments: Vec<&str> = url.trim_end_matches('/').split('/').collect();
    segments
        .iter()
        .rposition(|s| *s == "issues")
        .and_then(|idx| segments.get(idx + 1))
        .and_then(|n| n.parse().ok())
}

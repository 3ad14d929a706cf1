//! Webhook payload fixtures shaped like real GitHub deliveries.
//!
//! Each event builder returns a payload carrying every field the typed
//! events require, so tests can knock one out to provoke a validation error.

#![allow(dead_code)]

use serde_json::{json, Value};

const API: &str = "https://api.github.com/repos/octo/widgets";
const WEB: &str = "https://github.com/octo/widgets";
const TS: &str = "2024-01-15T10:30:00Z";
const SHA: &str = "6dcb09b5b57875f334f61aebed695e2e4193db5e";

pub fn user() -> Value {
    json!({
        "login": "octocat",
        "id": 583231,
        "node_id": "MDQ6VXNlcjU4MzIzMQ==",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "html_url": "https://github.com/octocat",
        "type": "User",
        "site_admin": false,
    })
}

pub fn repository() -> Value {
    json!({
        "id": 1296269,
        "node_id": "MDEwOlJlcG9zaXRvcnkxMjk2MjY5",
        "name": "widgets",
        "full_name": "octo/widgets",
        "private": false,
        "owner": user(),
        "html_url": WEB,
        "description": "Widgets for everyone",
        "fork": false,
        "url": API,
        "default_branch": "main",
    })
}

fn minimal_repository() -> Value {
    let mut repo = repository();
    if let Some(map) = repo.as_object_mut() {
        map.remove("default_branch");
    }
    repo
}

pub fn label() -> Value {
    json!({
        "id": 208045946,
        "node_id": "MDU6TGFiZWwyMDgwNDU5NDY=",
        "url": format!("{API}/labels/bug"),
        "name": "bug",
        "color": "f29513",
        "default": true,
        "description": "Something isn't working",
    })
}

pub fn app() -> Value {
    json!({
        "id": 15368,
        "slug": "github-actions",
        "node_id": "MDM6QXBwMTUzNjg=",
        "owner": user(),
        "name": "GitHub Actions",
        "html_url": "https://github.com/apps/github-actions",
        "created_at": TS,
        "updated_at": TS,
        "permissions": {"checks": "write"},
        "events": ["check_run"],
    })
}

pub fn issue() -> Value {
    json!({
        "url": format!("{API}/issues/42"),
        "repository_url": API,
        "html_url": format!("{WEB}/issues/42"),
        "id": 1347,
        "node_id": "MDU6SXNzdWUxMzQ3",
        "number": 42,
        "title": "Widget falls over",
        "user": user(),
        "labels": [label()],
        "state": "open",
        "locked": false,
        "assignee": null,
        "assignees": [],
        "comments": 1,
        "created_at": TS,
        "updated_at": TS,
        "closed_at": null,
        "author_association": "OWNER",
        "body": "It falls over when pushed.",
    })
}

pub fn comment() -> Value {
    json!({
        "url": format!("{API}/issues/comments/1"),
        "html_url": format!("{WEB}/issues/42#issuecomment-1"),
        "issue_url": format!("{API}/issues/42"),
        "id": 1,
        "node_id": "MDEyOklzc3VlQ29tbWVudDE=",
        "user": user(),
        "created_at": TS,
        "updated_at": TS,
        "author_association": "CONTRIBUTOR",
        "body": "Me too",
    })
}

pub fn discussion() -> Value {
    json!({
        "repository_url": API,
        "category": {
            "id": 55,
            "node_id": "MDE4OkRpc2N1c3Npb25DYXRlZ29yeTU1",
            "repository_id": 1296269,
            "emoji": ":speech_balloon:",
            "name": "General",
            "description": "Chat about anything",
            "slug": "general",
            "is_answerable": false,
        },
        "answer_html_url": null,
        "answer_chosen_at": null,
        "html_url": format!("{WEB}/discussions/7"),
        "id": 6090,
        "node_id": "MDEwOkRpc2N1c3Npb242MDkw",
        "number": 7,
        "title": "Roadmap",
        "user": user(),
        "state": "open",
        "locked": false,
        "comments": 0,
        "created_at": TS,
        "updated_at": TS,
        "author_association": "OWNER",
        "body": "What's next?",
    })
}

pub fn check_suite() -> Value {
    json!({
        "id": 118578147,
        "node_id": "MDEwOkNoZWNrU3VpdGUxMTg1NzgxNDc=",
        "head_branch": "main",
        "head_sha": SHA,
        "status": "completed",
        "conclusion": "success",
        "url": format!("{API}/check-suites/118578147"),
        "before": "146e867f55c26428e5f9fade55a9bbf5e95a7912",
        "after": SHA,
        "pull_requests": [],
        "app": app(),
        "created_at": TS,
        "updated_at": TS,
    })
}

pub fn check_run(status: &str) -> Value {
    json!({
        "id": 128620228,
        "name": "build",
        "node_id": "MDg6Q2hlY2tSdW4xMjg2MjAyMjg=",
        "head_sha": SHA,
        "external_id": "",
        "url": format!("{API}/check-runs/128620228"),
        "html_url": format!("{WEB}/runs/128620228"),
        "details_url": "https://octocoders.io",
        "status": status,
        "conclusion": if status == "completed" { json!("success") } else { Value::Null },
        "started_at": TS,
        "completed_at": if status == "completed" { json!(TS) } else { Value::Null },
        "output": {
            "title": null,
            "summary": null,
            "text": null,
            "annotations_count": 0,
            "annotations_url": format!("{API}/check-runs/128620228/annotations"),
        },
        "check_suite": check_suite(),
    })
}

pub fn workflow_job() -> Value {
    json!({
        "id": 2832853555_u64,
        "run_id": 940463255,
        "workflow_name": "CI",
        "head_branch": "main",
        "run_url": format!("{API}/actions/runs/940463255"),
        "run_attempt": 1,
        "node_id": "MDg6Q2hlY2tSdW4yODMyODUzNTU1",
        "head_sha": SHA,
        "url": format!("{API}/actions/jobs/2832853555"),
        "html_url": format!("{WEB}/runs/2832853555"),
        "status": "in_progress",
        "conclusion": null,
        "created_at": TS,
        "started_at": TS,
        "completed_at": null,
        "name": "test",
        "steps": [
            {"name": "Set up job", "status": "completed", "conclusion": "success", "number": 1},
            {"name": "Run tests", "status": "in_progress", "conclusion": null, "number": 2},
        ],
        "check_run_url": format!("{API}/check-runs/2832853555"),
        "labels": ["ubuntu-latest"],
        "runner_id": 1,
        "runner_name": "GitHub Actions 1",
    })
}

pub fn workflow() -> Value {
    json!({
        "id": 159038,
        "node_id": "MDg6V29ya2Zsb3cxNTkwMzg=",
        "name": "CI",
        "path": ".github/workflows/ci.yml",
        "state": "active",
        "created_at": TS,
        "updated_at": TS,
        "url": format!("{API}/actions/workflows/159038"),
        "html_url": format!("{WEB}/blob/main/.github/workflows/ci.yml"),
        "badge_url": format!("{WEB}/workflows/CI/badge.svg"),
    })
}

pub fn workflow_run() -> Value {
    let run = format!("{API}/actions/runs/940463255");
    json!({
        "id": 940463255,
        "name": "CI",
        "node_id": "MDExOldvcmtmbG93UnVuOTQwNDYzMjU1",
        "head_branch": "main",
        "head_sha": SHA,
        "path": ".github/workflows/ci.yml",
        "display_title": "Fix widget balance",
        "run_number": 12,
        "event": "push",
        "status": "completed",
        "conclusion": "success",
        "workflow_id": 159038,
        "check_suite_id": 118578147,
        "check_suite_node_id": "MDEwOkNoZWNrU3VpdGUxMTg1NzgxNDc=",
        "url": run,
        "html_url": format!("{WEB}/actions/runs/940463255"),
        "pull_requests": [],
        "created_at": TS,
        "updated_at": TS,
        "actor": user(),
        "run_attempt": 1,
        "run_started_at": TS,
        "triggering_actor": user(),
        "jobs_url": format!("{run}/jobs"),
        "logs_url": format!("{run}/logs"),
        "check_suite_url": format!("{API}/check-suites/118578147"),
        "artifacts_url": format!("{run}/artifacts"),
        "cancel_url": format!("{run}/cancel"),
        "rerun_url": format!("{run}/rerun"),
        "previous_attempt_url": null,
        "workflow_url": format!("{API}/actions/workflows/159038"),
        "head_commit": {"id": SHA, "message": "Fix widget balance"},
        "repository": minimal_repository(),
        "head_repository": minimal_repository(),
    })
}

pub fn commit() -> Value {
    let author = json!({"name": "Mona Octocat", "email": "mona@github.com", "username": "octocat"});
    json!({
        "id": SHA,
        "tree_id": "f9d2a07e9488b91af2641b26b9407fe22a451433",
        "distinct": true,
        "message": "Fix widget balance",
        "timestamp": "2024-01-15T11:30:00+01:00",
        "url": format!("{WEB}/commit/{SHA}"),
        "author": author,
        "committer": author,
        "added": [],
        "removed": [],
        "modified": ["src/widget.rs"],
    })
}

// ── Event payloads ──────────────────────────────────────────────────────────

pub fn discussion_event(action: &str) -> Value {
    json!({
        "action": action,
        "discussion": discussion(),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn issue_opened_event() -> Value {
    json!({
        "action": "opened",
        "issue": issue(),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn issue_comment_created_event() -> Value {
    json!({
        "action": "created",
        "issue": issue(),
        "comment": comment(),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn issues_labeled_event() -> Value {
    json!({
        "action": "labeled",
        "issue": issue(),
        "label": label(),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn check_run_event(action: &str) -> Value {
    let status = if action == "completed" { "completed" } else { "queued" };
    json!({
        "action": action,
        "check_run": check_run(status),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn check_suite_completed_event() -> Value {
    json!({
        "action": "completed",
        "check_suite": check_suite(),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn workflow_job_event(action: &str) -> Value {
    json!({
        "action": action,
        "workflow_job": workflow_job(),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn workflow_run_event(action: &str) -> Value {
    json!({
        "action": action,
        "workflow_run": workflow_run(),
        "workflow": workflow(),
        "repository": repository(),
        "sender": user(),
    })
}

pub fn push_event() -> Value {
    json!({
        "ref": "refs/heads/main",
        "before": "146e867f55c26428e5f9fade55a9bbf5e95a7912",
        "after": SHA,
        "repository": repository(),
        "pusher": {"name": "octocat", "email": "octocat@github.com"},
        "sender": user(),
        "created": false,
        "deleted": false,
        "forced": false,
        "base_ref": null,
        "compare": format!("{WEB}/compare/146e867f55c2...6dcb09b5b578"),
        "commits": [commit()],
        "head_commit": commit(),
    })
}

/// One payload per event kind, in classification-rule order.
pub fn all_events() -> Vec<(&'static str, Value)> {
    vec![
        ("DiscussionCreated", discussion_event("created")),
        ("DiscussionPinned", discussion_event("pinned")),
        ("IssueCommentCreated", issue_comment_created_event()),
        ("IssueOpened", issue_opened_event()),
        ("IssuesLabeled", issues_labeled_event()),
        ("CheckRunCreated", check_run_event("created")),
        ("CheckRunCompleted", check_run_event("completed")),
        ("CheckSuiteCompleted", check_suite_completed_event()),
        ("WorkflowJobEvent", workflow_job_event("queued")),
        ("WorkflowRunEvent", workflow_run_event("completed")),
        ("PushEvent", push_event()),
    ]
}

//! Webhook payload classification.
//!
//! Resolution happens in two steps. [`resolve_kind`] looks only at the
//! top-level keys and the `action` string, applying the rules in a fixed
//! priority order. The payload is then decoded strictly into the struct for
//! that kind, so a recognizable but drifted payload surfaces as
//! [`WebhookError::Validation`] rather than as an unknown shape.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::errors::WebhookError;
use crate::domain::models::{WebhookEvent, WebhookEventKind};

/// Classify a parsed payload into exactly one event.
pub fn classify(payload: &Value) -> Result<WebhookEvent, WebhookError> {
    let Value::Object(object) = payload else {
        return Err(WebhookError::NotAnObject);
    };
    let kind = resolve_kind(object)?;

    let event = match kind {
        WebhookEventKind::DiscussionCreated => {
            WebhookEvent::DiscussionCreated(decode(kind, payload)?)
        }
        WebhookEventKind::DiscussionPinned => WebhookEvent::DiscussionPinned(decode(kind, payload)?),
        WebhookEventKind::IssueOpened => WebhookEvent::IssueOpened(decode(kind, payload)?),
        WebhookEventKind::IssueCommentCreated => {
            WebhookEvent::IssueCommentCreated(decode(kind, payload)?)
        }
        WebhookEventKind::IssuesLabeled => WebhookEvent::IssuesLabeled(decode(kind, payload)?),
        WebhookEventKind::CheckRunCreated => WebhookEvent::CheckRunCreated(decode(kind, payload)?),
        WebhookEventKind::CheckRunCompleted => {
            WebhookEvent::CheckRunCompleted(decode(kind, payload)?)
        }
        WebhookEventKind::CheckSuiteCompleted => {
            WebhookEvent::CheckSuiteCompleted(decode(kind, payload)?)
        }
        WebhookEventKind::WorkflowJobEvent => WebhookEvent::WorkflowJobEvent(decode(kind, payload)?),
        WebhookEventKind::WorkflowRunEvent => WebhookEvent::WorkflowRunEvent(decode(kind, payload)?),
        WebhookEventKind::PushEvent => WebhookEvent::PushEvent(decode(kind, payload)?),
    };
    Ok(event)
}

/// Parse and classify a raw body.
pub fn classify_bytes(raw: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let payload: Value = serde_json::from_slice(raw).map_err(WebhookError::InvalidJson)?;
    classify(&payload)
}

/// Pick the event kind from the payload's shape. First matching rule wins.
///
/// An issue comment payload also carries `issue`, so the comment rule is
/// checked before the issue rules.
pub fn resolve_kind(object: &Map<String, Value>) -> Result<WebhookEventKind, WebhookError> {
    let has = |key: &str| object.contains_key(key);
    let action = object.get("action").and_then(Value::as_str);

    if is_relay_envelope(object) {
        return Err(WebhookError::RelayEnvelope);
    }

    if has("discussion") {
        match action {
            Some("created") => return Ok(WebhookEventKind::DiscussionCreated),
            Some("pinned") => return Ok(WebhookEventKind::DiscussionPinned),
            _ => {}
        }
    }

    if has("issue") {
        match action {
            Some("created") if has("comment") => return Ok(WebhookEventKind::IssueCommentCreated),
            Some("opened") => return Ok(WebhookEventKind::IssueOpened),
            Some("labeled") => return Ok(WebhookEventKind::IssuesLabeled),
            _ => {}
        }
    }

    if has("check_run") {
        match action {
            Some("created") => return Ok(WebhookEventKind::CheckRunCreated),
            Some("completed") => return Ok(WebhookEventKind::CheckRunCompleted),
            _ => {}
        }
    }

    if has("check_suite") && action == Some("completed") {
        return Ok(WebhookEventKind::CheckSuiteCompleted);
    }
    if has("workflow_job") {
        return Ok(WebhookEventKind::WorkflowJobEvent);
    }
    if has("workflow_run") {
        return Ok(WebhookEventKind::WorkflowRunEvent);
    }
    if has("ref") && has("commits") {
        return Ok(WebhookEventKind::PushEvent);
    }

    let mut keys: Vec<String> = object.keys().cloned().collect();
    keys.sort();
    Err(WebhookError::Unclassified { keys })
}

/// Smee-style relays wrap the delivery as `{body, timestamp}` or carry the
/// original headers inline.
fn is_relay_envelope(object: &Map<String, Value>) -> bool {
    (object.contains_key("body") && object.contains_key("timestamp"))
        || object.contains_key("x-github-event")
}

fn decode<T: DeserializeOwned>(kind: WebhookEventKind, payload: &Value) -> Result<T, WebhookError> {
    T::deserialize(payload).map_err(|source| WebhookError::Validation { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind_of(payload: Value) -> Result<WebhookEventKind, WebhookError> {
        match payload {
            Value::Object(map) => resolve_kind(&map),
            _ => Err(WebhookError::NotAnObject),
        }
    }

    #[test]
    fn test_comment_beats_issue_opened() {
        let kind = kind_of(json!({"action": "created", "issue": {}, "comment": {}})).unwrap();
        assert_eq!(kind, WebhookEventKind::IssueCommentCreated);
    }

    #[test]
    fn test_issue_created_without_comment_is_unclassified() {
        let err = kind_of(json!({"action": "created", "issue": {}})).unwrap_err();
        assert!(matches!(err, WebhookError::Unclassified { .. }));
    }

    #[test]
    fn test_relay_envelope_rejected_first() {
        let err = kind_of(json!({"body": {}, "timestamp": 1, "issue": {}, "action": "opened"}))
            .unwrap_err();
        assert!(matches!(err, WebhookError::RelayEnvelope));
        let err = kind_of(json!({"x-github-event": "push", "ref": "x", "commits": []}))
            .unwrap_err();
        assert!(matches!(err, WebhookError::RelayEnvelope));
    }

    #[test]
    fn test_body_without_timestamp_is_not_envelope() {
        let err = kind_of(json!({"body": "hello"})).unwrap_err();
        assert!(matches!(err, WebhookError::Unclassified { .. }));
    }

    #[test]
    fn test_workflow_job_matches_any_action() {
        for action in ["queued", "in_progress", "completed", "waiting"] {
            let kind = kind_of(json!({"action": action, "workflow_job": {}})).unwrap();
            assert_eq!(kind, WebhookEventKind::WorkflowJobEvent);
        }
    }

    #[test]
    fn test_discussion_with_other_action_falls_through() {
        let err = kind_of(json!({"action": "edited", "discussion": {}})).unwrap_err();
        let WebhookError::Unclassified { keys } = err else {
            panic!("expected unclassified");
        };
        assert_eq!(keys, vec!["action".to_string(), "discussion".to_string()]);
    }

    #[test]
    fn test_check_suite_requires_completed() {
        assert!(kind_of(json!({"action": "requested", "check_suite": {}})).is_err());
        assert_eq!(
            kind_of(json!({"action": "completed", "check_suite": {}})).unwrap(),
            WebhookEventKind::CheckSuiteCompleted
        );
    }

    #[test]
    fn test_push_requires_ref_and_commits() {
        assert!(kind_of(json!({"ref": "refs/heads/main"})).is_err());
        assert_eq!(
            kind_of(json!({"ref": "refs/heads/main", "commits": []})).unwrap(),
            WebhookEventKind::PushEvent
        );
    }

    #[test]
    fn test_unclassified_keys_are_sorted() {
        let err = kind_of(json!({"zen": "x", "hook_id": 1, "hook": {}})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown webhook event shape (keys: hook, hook_id, zen)"
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(classify(&json!([1, 2])), Err(WebhookError::NotAnObject)));
        assert!(matches!(classify(&json!("push")), Err(WebhookError::NotAnObject)));
    }

    #[test]
    fn test_shape_match_with_missing_fields_is_validation_error() {
        let err = classify(&json!({"action": "opened", "issue": {"number": 1}})).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            WebhookError::Validation { kind: WebhookEventKind::IssueOpened, .. }
        ));
    }

    #[test]
    fn test_classify_bytes_rejects_invalid_json() {
        assert!(matches!(
            classify_bytes(b"{not json"),
            Err(WebhookError::InvalidJson(_))
        ));
    }
}

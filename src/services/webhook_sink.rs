//! Webhook ingestion: raw archive first, classification second.
//!
//! Every delivery is appended as one line to `<log_dir>/<event>_<action>.jsonl`
//! before anything else looks at it, so a payload that fails to classify is
//! still on disk for later
//! [`replay_archive`](crate::services::archive_replay::replay_archive).

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult, WebhookError};
use crate::domain::models::WebhookEvent;
use crate::services::webhook_classifier::classify;

const UNKNOWN: &str = "unknown";

/// Result of ingesting one delivery.
#[derive(Debug)]
pub struct Ingested {
    /// Archive key, also the file stem the body was appended to.
    pub log_key: String,
    /// Classified event, or why classification failed.
    pub outcome: Result<WebhookEvent, WebhookError>,
}

/// Appends raw deliveries to the archive and classifies them.
#[derive(Debug)]
pub struct WebhookSink {
    log_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl WebhookSink {
    /// Sink appending under `log_dir`, created on first write.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Archive directory.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Archive `body` under its event key, then classify it.
    ///
    /// Only archive I/O failures are returned as errors. Classification
    /// failures are logged and reported in [`Ingested::outcome`].
    pub async fn ingest(&self, event: Option<&str>, body: &[u8]) -> DomainResult<Ingested> {
        let parsed: Result<Value, serde_json::Error> = serde_json::from_slice(body);
        let action = parsed
            .as_ref()
            .ok()
            .and_then(|v| v.get("action"))
            .and_then(Value::as_str);
        let log_key = log_key(event, action);

        self.append(&log_key, &archive_line(body, parsed.as_ref().ok()))
            .await?;

        let outcome = match parsed {
            Ok(payload) => classify(&payload),
            Err(e) => Err(WebhookError::InvalidJson(e)),
        };

        match &outcome {
            Ok(event) => tracing::info!(
                log_key = %log_key,
                kind = %event.kind(),
                repository = %event.repository().full_name,
                summary = %event.summary(),
                "webhook received"
            ),
            Err(e) if e.is_validation() => {
                tracing::warn!(log_key = %log_key, error = %e, "webhook failed validation");
            }
            Err(e) => tracing::warn!(log_key = %log_key, error = %e, "webhook not classified"),
        }

        Ok(Ingested { log_key, outcome })
    }

    async fn append(&self, log_key: &str, line: &str) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.log_dir)
            .await
            .map_err(|e| DomainError::io(&self.log_dir, e))?;

        let path = self.log_dir.join(format!("{log_key}.jsonl"));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| DomainError::io(&path, e))?;
        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| DomainError::io(&path, e))?;
        file.flush().await.map_err(|e| DomainError::io(&path, e))
    }
}

/// `<event>_<action>`, `unknown` standing in for either part.
///
/// Both parts come from the request, so anything outside `[A-Za-z0-9_-]`
/// becomes `_` and the key is always a plain file stem inside the log dir.
pub fn log_key(event: Option<&str>, action: Option<&str>) -> String {
    let event = event.filter(|e| !e.is_empty()).unwrap_or(UNKNOWN);
    let action = action.filter(|a| !a.is_empty()).unwrap_or(UNKNOWN);
    format!("{}_{}", key_part(event), key_part(action))
}

fn key_part(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// The archived form of a body: the body itself when it is already a single
/// line, otherwise its compact re-serialization.
fn archive_line(body: &[u8], parsed: Option<&Value>) -> String {
    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if !raw.contains(['\n', '\r']) {
        return raw.to_string();
    }
    parsed
        .and_then(|v| serde_json::to_string(v).ok())
        .unwrap_or_else(|| raw.replace(['\n', '\r'], " "))
}

//! Re-classification of the webhook archive.
//!
//! [`replay_archive`] walks every archived line. [`ArchiveReplayer`] remembers
//! how many lines of each file it has already classified, in
//! `<log_dir>/.replay_state.json`, so repeated runs only see new deliveries.
//! [`watch_archive`] drives a replayer from filesystem events.

use std::collections::BTreeMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::mpsc;

use crate::domain::errors::{DomainError, DomainResult, WebhookError};
use crate::domain::models::WebhookEventKind;
use crate::services::webhook_classifier::classify_bytes;

/// Name of the incremental replay state file inside the archive directory.
pub const STATE_FILE: &str = ".replay_state.json";

/// One archive line that could not be turned into an event.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFailure {
    /// 1-based line number within the archive file.
    pub line: usize,
    /// Classifier error.
    pub error: String,
}

/// Classification results for one archive file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayFile {
    /// File name, without the directory.
    pub file: String,
    /// Successfully classified lines per kind.
    pub counts: BTreeMap<WebhookEventKind, usize>,
    /// Relay envelopes, which are not webhook events.
    pub skipped: usize,
    /// Lines that failed to classify.
    pub failures: Vec<ReplayFailure>,
}

impl ReplayFile {
    fn named(path: &Path) -> Self {
        Self {
            file: file_name(path),
            ..Self::default()
        }
    }

    /// Number of lines classified successfully.
    pub fn classified(&self) -> usize {
        self.counts.values().sum()
    }

    fn record(&mut self, line_number: usize, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match classify_bytes(line.as_bytes()) {
            Ok(event) => *self.counts.entry(event.kind()).or_default() += 1,
            Err(WebhookError::RelayEnvelope) => self.skipped += 1,
            Err(e) => self.failures.push(ReplayFailure {
                line: line_number,
                error: e.to_string(),
            }),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_archive_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}

/// Every `*.jsonl` regular file in `dir`, sorted by name. A missing directory
/// has no files.
async fn archive_files(dir: &Path) -> DomainResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DomainError::io(dir, e)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::io(dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| DomainError::io(&path, e))?;
        if file_type.is_file() && is_archive_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Re-classify every line of every `*.jsonl` file in `dir`, sorted by file name.
///
/// Stateless: the replay state file is neither read nor written.
pub async fn replay_archive(dir: &Path) -> DomainResult<Vec<ReplayFile>> {
    let paths = archive_files(dir).await?;

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::io(&path, e))?;
        let mut file = ReplayFile::named(&path);
        for (idx, line) in contents.lines().enumerate() {
            file.record(idx + 1, line);
        }

        tracing::debug!(
            file = %file.file,
            classified = file.classified(),
            failures = file.failures.len(),
            "replayed archive file"
        );
        results.push(file);
    }
    Ok(results)
}

// ── Incremental replay ──────────────────────────────────────────────────────

/// Lines already classified, per archive file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayState {
    /// Complete lines consumed from each file.
    #[serde(default)]
    pub file_lines: BTreeMap<String, usize>,
    /// When each file was last advanced.
    #[serde(default)]
    pub last_processed_at: BTreeMap<String, DateTime<Utc>>,
}

impl ReplayState {
    /// Lines already consumed from `file`.
    pub fn processed_lines(&self, file: &str) -> usize {
        self.file_lines.get(file).copied().unwrap_or(0)
    }
}

/// Classifies only the archive lines appended since the previous run.
///
/// A line counts once it ends in `\n`; a partially written tail is left for
/// the next call. A file shorter than its recorded count was truncated or
/// rotated and is replayed from its first line.
#[derive(Debug)]
pub struct ArchiveReplayer {
    dir: PathBuf,
    state: ReplayState,
}

impl ArchiveReplayer {
    /// Load the replay state for `dir`.
    ///
    /// A missing state file starts from scratch. So does an unreadable one,
    /// with a warning.
    pub async fn open(dir: impl Into<PathBuf>) -> DomainResult<Self> {
        let dir = dir.into();
        let path = dir.join(STATE_FILE);
        let state = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "replay state unreadable, starting over");
                ReplayState::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => ReplayState::default(),
            Err(e) => return Err(DomainError::io(&path, e)),
        };
        Ok(Self { dir, state })
    }

    /// Archive directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current per-file progress.
    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    /// Classify new lines in every archive file.
    ///
    /// Only files that had new lines appear in the result. State for files
    /// that no longer exist is dropped.
    pub async fn process_all(&mut self) -> DomainResult<Vec<ReplayFile>> {
        let paths = archive_files(&self.dir).await?;

        let before = self.state.file_lines.len();
        let present: Vec<String> = paths.iter().map(|p| file_name(p)).collect();
        self.state.file_lines.retain(|name, _| present.contains(name));
        self.state
            .last_processed_at
            .retain(|name, _| present.contains(name));
        if self.state.file_lines.len() != before {
            self.save().await?;
        }

        let mut results = Vec::new();
        for path in paths {
            if let Some(file) = self.process_file(&path).await? {
                results.push(file);
            }
        }
        Ok(results)
    }

    /// Classify the lines of `path` past its recorded count.
    ///
    /// Returns `None` when the file is gone or has no new complete lines.
    /// Failure line numbers are absolute within the file.
    pub async fn process_file(&mut self, path: &Path) -> DomainResult<Option<ReplayFile>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::io(path, e)),
        };
        let Some(end) = bytes.iter().rposition(|b| *b == b'\n') else {
            return Ok(None);
        };
        let contents = String::from_utf8_lossy(&bytes[..=end]);
        let total = contents.lines().count();

        let name = file_name(path);
        let mut done = self.state.processed_lines(&name);
        if total < done {
            tracing::warn!(file = %name, recorded = done, lines = total, "archive file shrank, replaying from the start");
            done = 0;
        }
        if total == done {
            return Ok(None);
        }

        let mut file = ReplayFile::named(path);
        for (idx, line) in contents.lines().enumerate().skip(done) {
            file.record(idx + 1, line);
        }

        self.state.file_lines.insert(name.clone(), total);
        self.state.last_processed_at.insert(name, Utc::now());
        self.save().await?;

        tracing::debug!(
            file = %file.file,
            from_line = done + 1,
            to_line = total,
            classified = file.classified(),
            failures = file.failures.len(),
            "replayed new archive lines"
        );
        Ok(Some(file))
    }

    async fn save(&self) -> DomainResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::io(&self.dir, e))?;
        let path = self.dir.join(STATE_FILE);
        let tmp = self.dir.join(format!("{STATE_FILE}.tmp"));
        let bytes = serde_json::to_vec_pretty(&self.state)?;
        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| DomainError::io(&tmp, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| DomainError::io(&path, e))
    }
}

// ── Watch ───────────────────────────────────────────────────────────────────

/// Replay new archive lines as they are written, until `shutdown` resolves.
///
/// The backlog since the last recorded state is handed to `on_batch` first.
/// After that, every create or modify event on a `*.jsonl` file produces a
/// batch for the files that gained complete lines. Per-file errors are
/// logged and the watch carries on.
pub async fn watch_archive<F>(
    dir: &Path,
    shutdown: impl Future<Output = ()>,
    mut on_batch: F,
) -> DomainResult<()>
where
    F: FnMut(&[ReplayFile]),
{
    fs::create_dir_all(dir)
        .await
        .map_err(|e| DomainError::io(dir, e))?;
    let mut replayer = ArchiveReplayer::open(dir).await?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| {
            let _ = tx.send(result);
        },
        notify::Config::default(),
    )
    .map_err(|e| DomainError::Watch(e.to_string()))?;
    // Registered before the backlog pass so no append falls between the two.
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| DomainError::Watch(e.to_string()))?;
    tracing::info!(dir = %dir.display(), "watching webhook archive");

    let backlog = replayer.process_all().await?;
    if !backlog.is_empty() {
        on_batch(&backlog);
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            received = rx.recv() => {
                let Some(received) = received else { break };
                let event = match received {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "archive watch error");
                        continue;
                    }
                };
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    continue;
                }

                let mut batch = Vec::new();
                for path in event.paths.iter().filter(|p| is_archive_file(p)) {
                    match replayer.process_file(path).await {
                        Ok(Some(file)) => batch.push(file),
                        Ok(None) => {}
                        Err(e) => tracing::warn!(path = %path.display(), error = %e, "archive replay failed"),
                    }
                }
                if !batch.is_empty() {
                    on_batch(&batch);
                }
            }
        }
    }

    drop(watcher);
    tracing::info!(dir = %dir.display(), "stopped watching webhook archive");
    Ok(())
}

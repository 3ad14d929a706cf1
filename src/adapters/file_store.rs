//! File-per-entity local store.
//!
//! Layout under the root:
//!
//! ```text
//! issues/<number>.json
//! issue_comments/<issue_number>/<comment_id>.json
//! discussions/<number>.json
//! discussion_comments/<discussion_number>/<sanitized_comment_id>.json
//! sync_state.json
//! ```
//!
//! Writes are last-write-wins overwrites; nothing is ever deleted. I/O
//! errors are returned as-is, the store never retries.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tokio::fs;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    CommentKind, CursorUpdate, EntityKind, RemoteId, StoreStats, SyncCursor,
};

const CURSOR_FILE: &str = "sync_state.json";
const JSON_EXT: &str = "json";

/// Local store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store handle. Nothing is touched on disk until [`init`](Self::init).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the store has been initialized.
    pub async fn exists(&self) -> DomainResult<bool> {
        let path = self.cursor_path();
        fs::try_exists(&path)
            .await
            .map_err(|e| DomainError::io(&path, e))
    }

    /// Create the directory layout and a default cursor.
    ///
    /// Idempotent: existing entities and an existing cursor are left alone.
    pub async fn init(&self) -> DomainResult<()> {
        let dirs = [
            self.root.join(EntityKind::Issue.dir_name()),
            self.root.join(CommentKind::Issue.dir_name()),
            self.root.join(EntityKind::Discussion.dir_name()),
            self.root.join(CommentKind::Discussion.dir_name()),
        ];
        for dir in &dirs {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| DomainError::io(dir, e))?;
        }

        let cursor_path = self.cursor_path();
        if !fs::try_exists(&cursor_path)
            .await
            .map_err(|e| DomainError::io(&cursor_path, e))?
        {
            self.write_cursor(&SyncCursor::default()).await?;
        }

        tracing::info!(root = %self.root.display(), "store initialized");
        Ok(())
    }

    // ── Entities ────────────────────────────────────────────────────────────

    /// Overwrite the file for `key`.
    pub async fn save_entity(&self, kind: EntityKind, key: u64, payload: &Value) -> DomainResult<()> {
        let path = self.entity_path(kind, key);
        write_json(&path, payload).await
    }

    /// Load an entity; `None` when it has never been stored.
    pub async fn load_entity(&self, kind: EntityKind, key: u64) -> DomainResult<Option<Value>> {
        read_json(&self.entity_path(kind, key)).await
    }

    /// Sequence numbers stored for `kind`, in no particular order.
    pub async fn list_keys(&self, kind: EntityKind) -> DomainResult<Vec<u64>> {
        let dir = self.root.join(kind.dir_name());
        let stems = json_stems(&dir).await?;
        Ok(stems.iter().filter_map(|s| s.parse().ok()).collect())
    }

    // ── Comments ────────────────────────────────────────────────────────────

    /// Overwrite one comment under its parent, creating the parent directory.
    pub async fn save_comment(
        &self,
        kind: CommentKind,
        parent_key: u64,
        comment_id: &RemoteId,
        payload: &Value,
    ) -> DomainResult<()> {
        let dir = self.comment_dir(kind, parent_key);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::io(&dir, e))?;
        let path = dir.join(format!("{}.{JSON_EXT}", comment_id.file_stem()));
        write_json(&path, payload).await
    }

    /// All comments stored under a parent; empty when the parent has none.
    pub async fn load_comments(&self, kind: CommentKind, parent_key: u64) -> DomainResult<Vec<Value>> {
        let dir = self.comment_dir(kind, parent_key);
        let mut comments = Vec::new();
        for stem in json_stems(&dir).await? {
            if let Some(comment) = read_json(&dir.join(format!("{stem}.{JSON_EXT}"))).await? {
                comments.push(comment);
            }
        }
        Ok(comments)
    }

    // ── Cursor ──────────────────────────────────────────────────────────────

    /// Read the cursor; a missing file reads as the default cursor.
    pub async fn load_cursor(&self) -> DomainResult<SyncCursor> {
        let path = self.cursor_path();
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SyncCursor::default()),
            Err(e) => Err(DomainError::io(&path, e)),
        }
    }

    /// Merge `update` into the persisted cursor and stamp `last_sync_at`.
    ///
    /// The new cursor replaces the old one with a single rename.
    pub async fn update_cursor(&self, update: CursorUpdate) -> DomainResult<SyncCursor> {
        let mut cursor = self.load_cursor().await?;
        cursor.apply(update, Utc::now());
        self.write_cursor(&cursor).await?;
        tracing::debug!(
            repository = ?cursor.repository,
            issues_last_sync = ?cursor.issues_last_sync_at,
            discussions_last_sync = ?cursor.discussions_last_sync_at,
            "cursor updated"
        );
        Ok(cursor)
    }

    async fn write_cursor(&self, cursor: &SyncCursor) -> DomainResult<()> {
        let path = self.cursor_path();
        let tmp = self.root.join(format!("{CURSOR_FILE}.tmp"));
        let bytes = serde_json::to_vec_pretty(cursor)?;
        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| DomainError::io(&tmp, e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| DomainError::io(&path, e))
    }

    // ── Stats ───────────────────────────────────────────────────────────────

    /// File counts per kind. Missing directories count as zero.
    pub async fn stats(&self) -> DomainResult<StoreStats> {
        Ok(StoreStats {
            issues: json_stems(&self.root.join(EntityKind::Issue.dir_name())).await?.len(),
            issue_comments: self.count_comments(CommentKind::Issue).await?,
            discussions: json_stems(&self.root.join(EntityKind::Discussion.dir_name()))
                .await?
                .len(),
            discussion_comments: self.count_comments(CommentKind::Discussion).await?,
        })
    }

    async fn count_comments(&self, kind: CommentKind) -> DomainResult<usize> {
        let dir = self.root.join(kind.dir_name());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(DomainError::io(&dir, e)),
        };

        let mut total = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::io(&dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| DomainError::io(entry.path(), e))?;
            if file_type.is_dir() {
                total += json_stems(&entry.path()).await?.len();
            }
        }
        Ok(total)
    }

    // ── Paths ───────────────────────────────────────────────────────────────

    fn entity_path(&self, kind: EntityKind, key: u64) -> PathBuf {
        self.root
            .join(kind.dir_name())
            .join(format!("{key}.{JSON_EXT}"))
    }

    fn comment_dir(&self, kind: CommentKind, parent_key: u64) -> PathBuf {
        self.root.join(kind.dir_name()).join(parent_key.to_string())
    }

    fn cursor_path(&self) -> PathBuf {
        self.root.join(CURSOR_FILE)
    }
}

async fn write_json(path: &Path, payload: &Value) -> DomainResult<()> {
    let bytes = serde_json::to_vec_pretty(payload)?;
    fs::write(path, bytes)
        .await
        .map_err(|e| DomainError::io(path, e))
}

async fn read_json(path: &Path) -> DomainResult<Option<Value>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DomainError::io(path, e)),
    }
}

/// Stems of the `*.json` files directly inside `dir`.
async fn json_stems(dir: &Path) -> DomainResult<Vec<String>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DomainError::io(dir, e)),
    };

    let mut stems = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::io(dir, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(JSON_EXT) {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| DomainError::io(&path, e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push(stem.to_string());
        }
    }
    Ok(stems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store() -> (TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join(".gitman"));
        store.init().await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_init_creates_layout_and_default_cursor() {
        let (_dir, store) = store().await;
        for sub in ["issues", "issue_comments", "discussions", "discussion_comments"] {
            assert!(store.root().join(sub).is_dir(), "{sub} missing");
        }
        assert!(store.exists().await.unwrap());
        assert_eq!(store.load_cursor().await.unwrap(), SyncCursor::default());
    }

    #[tokio::test]
    async fn test_init_is_idempotent_and_keeps_data() {
        let (_dir, store) = store().await;
        store
            .save_entity(EntityKind::Issue, 3, &json!({"number": 3}))
            .await
            .unwrap();
        store
            .update_cursor(CursorUpdate {
                repository: Some("o/r".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        store.init().await.unwrap();

        assert_eq!(store.list_keys(EntityKind::Issue).await.unwrap(), vec![3]);
        assert_eq!(
            store.load_cursor().await.unwrap().repository.as_deref(),
            Some("o/r")
        );
    }

    #[tokio::test]
    async fn test_save_entity_overwrites() {
        let (_dir, store) = store().await;
        store
            .save_entity(EntityKind::Issue, 1, &json!({"number": 1, "title": "old"}))
            .await
            .unwrap();
        store
            .save_entity(EntityKind::Issue, 1, &json!({"number": 1, "title": "new"}))
            .await
            .unwrap();
        let loaded = store.load_entity(EntityKind::Issue, 1).await.unwrap().unwrap();
        assert_eq!(loaded["title"], "new");
    }

    #[tokio::test]
    async fn test_entity_written_as_pretty_json() {
        let (_dir, store) = store().await;
        store
            .save_entity(EntityKind::Discussion, 4, &json!({"number": 4}))
            .await
            .unwrap();
        let raw = std::fs::read_to_string(store.root().join("discussions/4.json")).unwrap();
        assert_eq!(raw, "{\n  \"number\": 4\n}");
    }

    #[tokio::test]
    async fn test_load_missing_entity_is_none() {
        let (_dir, store) = store().await;
        assert!(store.load_entity(EntityKind::Issue, 404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keys_ignores_non_numeric_and_non_json() {
        let (_dir, store) = store().await;
        store
            .save_entity(EntityKind::Issue, 5, &json!({}))
            .await
            .unwrap();
        std::fs::write(store.root().join("issues/notes.json"), "{}").unwrap();
        std::fs::write(store.root().join("issues/6.txt"), "").unwrap();

        assert_eq!(store.list_keys(EntityKind::Issue).await.unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_list_keys_on_uninitialized_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nowhere"));
        assert!(store.list_keys(EntityKind::Discussion).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_comment_creates_parent_dir() {
        let (_dir, store) = store().await;
        store
            .save_comment(
                CommentKind::Issue,
                42,
                &RemoteId::Number(99),
                &json!({"id": 99}),
            )
            .await
            .unwrap();
        assert!(store.root().join("issue_comments/42/99.json").is_file());
        assert_eq!(store.load_comments(CommentKind::Issue, 42).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_discussion_comment_id_is_sanitized() {
        let (_dir, store) = store().await;
        let id = RemoteId::Node("DC:kw/1".to_string());
        store
            .save_comment(CommentKind::Discussion, 8, &id, &json!({"id": "DC:kw/1"}))
            .await
            .unwrap();
        assert!(store.root().join("discussion_comments/8/DC_kw_1.json").is_file());
    }

    #[tokio::test]
    async fn test_load_comments_for_unknown_parent_is_empty() {
        let (_dir, store) = store().await;
        assert!(store
            .load_comments(CommentKind::Discussion, 1)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_cursor_merges_and_stamps() {
        let (_dir, store) = store().await;
        let issues_ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();

        let cursor = store
            .update_cursor(CursorUpdate {
                repository: Some("octo/widgets".to_string()),
                issues_last_sync_at: Some(issues_ts),
                discussions_last_sync_at: None,
            })
            .await
            .unwrap();

        assert_eq!(cursor.repository.as_deref(), Some("octo/widgets"));
        assert_eq!(cursor.issues_last_sync_at, Some(issues_ts));
        assert!(cursor.discussions_last_sync_at.is_none());
        assert!(cursor.last_sync_at.is_some());
        assert_eq!(store.load_cursor().await.unwrap(), cursor);
        assert!(!store.root().join("sync_state.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_cursor_file_field_names() {
        let (_dir, store) = store().await;
        let raw = std::fs::read_to_string(store.root().join("sync_state.json")).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        for field in ["repository", "last_sync", "issues_last_sync", "discussions_last_sync"] {
            assert!(value.get(field).is_some(), "{field} missing");
        }
    }

    #[tokio::test]
    async fn test_stats_counts_all_kinds() {
        let (_dir, store) = store().await;
        store.save_entity(EntityKind::Issue, 1, &json!({})).await.unwrap();
        store.save_entity(EntityKind::Issue, 2, &json!({})).await.unwrap();
        store.save_entity(EntityKind::Discussion, 1, &json!({})).await.unwrap();
        store
            .save_comment(CommentKind::Issue, 1, &RemoteId::Number(10), &json!({}))
            .await
            .unwrap();
        store
            .save_comment(CommentKind::Issue, 2, &RemoteId::Number(11), &json!({}))
            .await
            .unwrap();
        store
            .save_comment(
                CommentKind::Discussion,
                1,
                &RemoteId::Node("DC_1".to_string()),
                &json!({}),
            )
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(
            stats,
            StoreStats {
                issues: 2,
                issue_comments: 2,
                discussions: 1,
                discussion_comments: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_stats_on_missing_root_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent"));
        assert_eq!(store.stats().await.unwrap(), StoreStats::default());
        assert!(!store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = FileStore::new(&blocker).exists().await.unwrap_err();
        assert!(matches!(err, DomainError::Io { .. }));
    }

    #[tokio::test]
    async fn test_scans_skip_entries_of_the_wrong_type() {
        let (_dir, store) = store().await;
        store
            .save_entity(EntityKind::Issue, 1, &json!({"number": 1}))
            .await
            .unwrap();
        std::fs::create_dir(store.root().join("issues/2.json")).unwrap();
        std::fs::write(store.root().join("issue_comments/stray.json"), "{}").unwrap();

        assert_eq!(store.list_keys(EntityKind::Issue).await.unwrap(), vec![1]);
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.issues, 1);
        assert_eq!(stats.issue_comments, 0);
    }
}

//! Domain models: entities, sync bookkeeping, config and webhook events.

pub mod config;
pub mod entity;
pub mod sync;
pub mod webhook;

pub use config::{Config, GitHubConfig, LoggingConfig, StorageConfig, WebhookConfig};
pub use entity::{CommentKind, EntityKind, RemoteId, RepoRef};
pub use sync::{CursorUpdate, SingleSyncOutcome, StoreStats, SyncCursor, SyncPhase, SyncReport};
pub use webhook::{WebhookEvent, WebhookEventKind};

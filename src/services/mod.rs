//! Services: sync orchestration and webhook handling.

pub mod archive_replay;
pub mod sync_service;
pub mod webhook_classifier;
pub mod webhook_sink;

pub use archive_replay::{replay_archive, watch_archive, ArchiveReplayer};
pub use sync_service::SyncOrchestrator;
pub use webhook_classifier::{classify, classify_bytes};
pub use webhook_sink::{Ingested, WebhookSink};

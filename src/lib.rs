//! gitman - GitHub issue and discussion mirror
//!
//! Mirrors a repository's issues, discussions and their comments into
//! plain JSON files, and classifies live webhook deliveries into a closed
//! set of typed events.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): entity and event models, errors, the
//!   [`RemoteClient`](domain::ports::RemoteClient) port
//! - **Service Layer** (`services`): sync orchestration, webhook
//!   classification and ingestion
//! - **Adapters** (`adapters`): file store, GitHub client, HTTP receiver
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gitman::{FileStore, GitHubClient, SyncOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = gitman::ConfigLoader::load()?;
//!     let client = GitHubClient::from_config(&config.github)?;
//!     let store = FileStore::new(&config.storage.root);
//!     let repo = "octo/widgets".parse()?;
//!     let report = SyncOrchestrator::new(Arc::new(client), store, repo)
//!         .sync_all(true)
//!         .await?;
//!     println!("{report:?}");
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::file_store::FileStore;
pub use adapters::github::GitHubClient;
pub use domain::errors::{DomainError, SyncError, WebhookError};
pub use domain::models::{
    Config, RepoRef, SingleSyncOutcome, SyncCursor, SyncReport, WebhookEvent, WebhookEventKind,
};
pub use domain::ports::{Page, PageToken, RemoteClient};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::sync_service::SyncOrchestrator;
pub use services::webhook_classifier::classify;
pub use services::webhook_sink::WebhookSink;

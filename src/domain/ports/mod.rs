//! Port trait definitions (Hexagonal Architecture)
//!
//! - RemoteClient: paginated access to the remote tracker
//!
//! Adapters implement these so the services stay independent of any
//! specific transport.

pub mod remote_client;

pub use remote_client::{IssueState, Page, PageToken, RemoteClient};

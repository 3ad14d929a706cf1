//! Domain layer for the gitman sync engine
//!
//! This module contains the entity and event models, the error taxonomy and
//! the port traits the services are written against.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{DomainError, DomainResult, SyncError, SyncResult, WebhookError};

//! Domain errors for the gitman sync engine.

use thiserror::Error;

use super::models::sync::SyncPhase;
use super::models::webhook::WebhookEventKind;

/// Domain-level errors raised by the store and the remote client.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Filesystem failure at `path`.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Transport failure or non-success status from the remote.
    #[error("Remote request failed: {0}")]
    Remote(String),

    /// Quota exhausted and not refilled in time.
    #[error("Rate limit exhausted: {0}")]
    RateLimited(String),

    /// Malformed JSON on disk or on the wire.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Input rejected before any I/O.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// No cursor file under the storage root.
    #[error("Store not initialized at {0}")]
    NotInitialized(String),

    /// Filesystem watcher could not be started.
    #[error("Watch failed: {0}")]
    Watch(String),
}

/// Result alias for store and remote operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// A sync pass that aborted part-way through.
///
/// The wrapped error is the one raised by the store or the remote client,
/// untouched; only the phase and repository are added.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A phase raised an error.
    #[error("failed during {phase} phase for {repository}: {source}")]
    PhaseFailed {
        /// Phase that was running.
        phase: SyncPhase,
        /// `owner/name` of the repository.
        repository: String,
        /// Error raised by the phase.
        #[source]
        source: DomainError,
    },

    /// Reading or writing the cursor failed.
    #[error("failed to access sync cursor for {repository}: {source}")]
    Cursor {
        /// `owner/name` of the repository.
        repository: String,
        /// Underlying store error.
        #[source]
        source: DomainError,
    },
}

impl SyncError {
    /// The phase that was running when the pass aborted, if any.
    pub const fn phase(&self) -> Option<SyncPhase> {
        match self {
            Self::PhaseFailed { phase, .. } => Some(*phase),
            Self::Cursor { .. } => None,
        }
    }
}

/// Result alias for sync passes.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure to turn a webhook payload into a typed event.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Relay wrapper carrying `action` and `payload`.
    #[error("payload is a relay envelope, not a webhook event")]
    RelayEnvelope,

    /// Valid JSON, but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// Body failed to parse.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// No rule matched.
    #[error("unknown webhook event shape (keys: {})", .keys.join(", "))]
    Unclassified {
        /// Top-level keys of the payload, sorted.
        keys: Vec<String>,
    },

    /// A rule matched but the typed model rejected the payload.
    #[error("payload matched {kind} but failed validation: {source}")]
    Validation {
        /// Kind the payload was routed to.
        kind: WebhookEventKind,
        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl WebhookError {
    /// True when the payload had a recognizable shape but the fields drifted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

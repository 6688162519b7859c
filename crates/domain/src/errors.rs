//! Domain-level errors

use thiserror::Error;

/// A value failed domain validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Status string outside the known task lifecycle
    #[error("Invalid task status: {0}")]
    InvalidTaskStatus(String),

    /// Provider event ids must be non-blank
    #[error("Invalid remote event id: {0:?}")]
    InvalidRemoteEventId(String),
}

//! Domain-level error types.

use thiserror::Error;

use crate::domain::PostStatus;
use crate::ports::FeedError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: PostStatus, to: PostStatus },

    /// The external content source was unreachable or returned malformed data.
    #[error("Upstream feed error: {0}")]
    Upstream(#[from] FeedError),

    /// Persistence failure. Not retried here; the caller decides.
    #[error("Store error: {0}")]
    Store(#[from] RepoError),
}

impl DomainError {
    pub fn post_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Post",
            id: id.into(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Optimistic concurrency retries were exhausted.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),
}

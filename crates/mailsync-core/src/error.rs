//! Error types for the mailsync system
//!
//! This module defines all error types used throughout the crate.
//!
//! The first five variants form the synchronization taxonomy that callers
//! match on. The rest are ambient failures (storage, configuration, I/O).

use thiserror::Error;

use crate::validation::FieldErrors;

/// Result type alias for mailsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies a parent record in a scoped lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentKey {
    /// Entity kind of the parent (e.g. `MailChimpList`)
    pub kind: &'static str,
    /// Local identifier of the parent
    pub id: String,
}

/// Core error type for the mailsync system
#[derive(Error, Debug)]
pub enum Error {
    /// The parent a create was scoped to does not exist locally
    #[error("{kind}[{id}] not found")]
    ParentNotFound {
        /// Entity kind of the missing parent
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The entity does not exist (within its parent, if scoped)
    #[error("{}", entity_not_found_message(kind, id, parent.as_ref()))]
    EntityNotFound {
        /// Entity kind that was looked up
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
        /// Parent scope of the lookup, if any
        parent: Option<ParentKey>,
    },

    /// The candidate representation failed its rule set
    #[error("Invalid data given")]
    ValidationFailed {
        /// Field path -> violation messages
        errors: FieldErrors,
    },

    /// The entity still owns child records and cannot be deleted
    #[error("{kind}[{id}] still has {count} {child_kind} record(s)")]
    HasChildren {
        /// Entity kind that was to be deleted
        kind: &'static str,
        /// Identifier of that entity
        id: String,
        /// Entity kind of the children
        child_kind: &'static str,
        /// Number of children found
        count: usize,
    },

    /// The remote provider rejected or failed the call
    #[error("{0}")]
    RemoteCallFailed(String),

    /// Local store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn entity_not_found_message(kind: &str, id: &str, parent: Option<&ParentKey>) -> String {
    match parent {
        Some(parent) => format!("{kind}[{id}] in {}[{}] not found", parent.kind, parent.id),
        None => format!("{kind}[{id}] not found"),
    }
}

impl Error {
    /// Create a "parent not found" error
    pub fn parent_not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::ParentNotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create an "entity not found" error
    pub fn entity_not_found(
        kind: &'static str,
        id: impl Into<String>,
        parent: Option<ParentKey>,
    ) -> Self {
        Self::EntityNotFound {
            kind,
            id: id.into(),
            parent,
        }
    }

    /// Create a validation error from collected field errors
    pub fn validation(errors: FieldErrors) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a "still has children" error
    pub fn has_children(
        kind: &'static str,
        id: impl Into<String>,
        child_kind: &'static str,
        count: usize,
    ) -> Self {
        Self::HasChildren {
            kind,
            id: id.into(),
            child_kind,
            count,
        }
    }

    /// Create a remote call error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteCallFailed(msg.into())
    }

    /// Create a local store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is one of the two not-found kinds
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ParentNotFound { .. } | Self::EntityNotFound { .. }
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

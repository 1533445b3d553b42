//! Error types for store operations.

use std::io;
use syncvault_record::RecordError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse classification of a [`StoreError`], used by the protocol layer
/// for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Revision, path, or object does not exist.
    NotFound,
    /// Path escapes the checkout root.
    InvalidPath,
    /// Path already holds an entry.
    AlreadyExists,
    /// Expected-revision guard did not match.
    OutOfDate,
    /// A parent revision was given where no entry exists.
    InvalidParent,
    /// Backing-store failure.
    Internal,
}

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Revision, path, or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Path escapes the checkout root or is otherwise unusable.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// Path already holds an entry.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Expected-revision guard did not match the current entry.
    #[error("out of date: expected revision {expected}, found {actual}")]
    OutOfDate {
        /// Revision the caller expected.
        expected: String,
        /// Revision actually present.
        actual: String,
    },

    /// A parent revision was given for a path with no entry.
    #[error("invalid parent revision: no entry at {0}")]
    InvalidParent(String),

    /// A plumbing record failed to decode.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another process holds the repository lock.
    #[error("repository locked: another process has exclusive access")]
    Locked,

    /// The backing store misbehaved.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates an invalid-path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classifies this error for status mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::InvalidPath(_) => ErrorKind::InvalidPath,
            StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StoreError::OutOfDate { .. } => ErrorKind::OutOfDate,
            StoreError::InvalidParent(_) => ErrorKind::InvalidParent,
            StoreError::Record(_)
            | StoreError::Io(_)
            | StoreError::Locked
            | StoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}

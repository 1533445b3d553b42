//! Error types for reconciliation.

use thiserror::Error;

/// Result type for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The classifier was called with no entry on any side.
    #[error("classifier called with no entry on any side")]
    AllAbsent,

    /// An input list violates the sorted-unique-paths precondition.
    #[error("input list {list} is not strictly sorted at {path:?}")]
    UnsortedInput {
        /// Zero-based index of the offending list.
        list: usize,
        /// The path at which order breaks.
        path: String,
    },
}

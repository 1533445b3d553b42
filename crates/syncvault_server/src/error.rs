//! Error types and status mapping for the sync server.

use syncvault_reconcile::ReconcileError;
use syncvault_store::{ErrorKind, StoreError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while handling a sync request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The posted listings failed reconciliation preconditions.
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// The request itself is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ServerError {
    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::Store(e) => match e.kind() {
                ErrorKind::NotFound | ErrorKind::InvalidPath => 404,
                ErrorKind::OutOfDate => 409,
                ErrorKind::AlreadyExists | ErrorKind::InvalidParent | ErrorKind::Internal => 500,
            },
            // A client posting an unsorted index is a bad request, not
            // a server fault.
            ServerError::Reconcile(_) => 400,
            ServerError::InvalidRequest(_) => 400,
        }
    }

    /// Message safe to return to the client. Server faults are reduced
    /// to a generic message so no internal detail leaks.
    pub fn public_message(&self) -> String {
        if self.status_code() >= 500 {
            "internal error".to_string()
        } else {
            self.to_string()
        }
    }
}

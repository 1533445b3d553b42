//! Request and response envelopes for the sync operations.

use crate::{Change, FileEntry, SyncAction};
use serde::{Deserialize, Serialize};

/// Request for a full three-way reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRequest {
    /// The client's current file listing, sorted ascending by path.
    #[serde(rename = "clientIndex")]
    pub client_index: Vec<FileEntry>,
    /// Revision both sides agreed on at the last successful sync;
    /// empty for a first sync.
    #[serde(rename = "lastSyncRevision")]
    pub last_sync_revision: String,
}

/// Response to a [`DiffRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResponse {
    /// The server revision the actions were computed against.
    #[serde(rename = "serverRevision")]
    pub server_revision: String,
    /// Ordered reconciliation actions.
    pub changes: Vec<SyncAction>,
}

/// Request for an incremental two-revision pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRequest {
    /// The revision the client currently holds; empty for everything.
    #[serde(rename = "clientRevision")]
    pub client_revision: String,
}

/// Response to a [`DeltaRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaResponse {
    /// Changes between the client revision and the server revision.
    pub changes: Vec<Change>,
    /// The server revision the changes lead up to.
    #[serde(rename = "serverRevision")]
    pub server_revision: String,
}

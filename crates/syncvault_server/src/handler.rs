//! Request handlers for sync endpoints.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use std::sync::Arc;
use syncvault_protocol::{
    DeltaRequest, DeltaResponse, DiffRequest, DiffResponse, FileEntry, RevisionEntry,
};
use syncvault_reconcile::diff_entries;
use syncvault_store::{ContentStream, PutOptions, PutResult, ReadOptions, Repository};
use tracing::debug;

/// Handler for sync requests over one repository.
pub struct RequestHandler {
    config: ServerConfig,
    repo: Arc<Repository>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(config: ServerConfig, repo: Arc<Repository>) -> Self {
        Self { config, repo }
    }

    /// Full three-way reconciliation: the posted client index against
    /// the committed tree at the last-synced revision and the live
    /// server index.
    pub fn handle_diff(&self, request: DiffRequest) -> ServerResult<DiffResponse> {
        if request.client_index.len() > self.config.max_index_entries {
            return Err(ServerError::InvalidRequest(format!(
                "client index too large: {} > {}",
                request.client_index.len(),
                self.config.max_index_entries
            )));
        }

        let server_revision = self.repo.head()?;
        let base = if request.last_sync_revision.is_empty() {
            Vec::new()
        } else {
            self.repo.get_tree(&request.last_sync_revision, None)?
        };
        let right = self.repo.index_entries(None)?;

        let changes = diff_entries(&request.client_index, &base, &right)?;
        debug!(
            client = request.client_index.len(),
            base = base.len(),
            right = right.len(),
            actions = changes.len(),
            "reconciled"
        );

        Ok(DiffResponse {
            server_revision,
            changes,
        })
    }

    /// Incremental pull: a pure two-revision diff, no three-way logic.
    pub fn handle_delta(&self, request: DeltaRequest) -> ServerResult<DeltaResponse> {
        let server_revision = self.repo.head()?;
        let changes = self
            .repo
            .diff_tree(&request.client_revision, &server_revision)?;
        Ok(DeltaResponse {
            changes,
            server_revision,
        })
    }

    /// Streams a file's committed content.
    pub fn handle_read(&self, path: &str, revision: Option<String>) -> ContentStream {
        self.repo.read_stream(path, ReadOptions { revision })
    }

    /// Merge-aware upload.
    pub fn handle_put(
        &self,
        path: &str,
        content: &[u8],
        options: PutOptions<'_>,
    ) -> ServerResult<PutResult> {
        Ok(self.repo.put_file(path, content, options)?)
    }

    /// Guarded delete.
    pub fn handle_remove(
        &self,
        path: &str,
        expected_revision: Option<&str>,
    ) -> ServerResult<syncvault_protocol::Commit> {
        Ok(self.repo.remove_file(path, expected_revision)?)
    }

    /// File metadata at a revision.
    pub fn handle_metadata(&self, path: &str, revision: &str) -> ServerResult<FileEntry> {
        Ok(self.repo.file_entry(path, revision)?)
    }

    /// Per-path revision listing.
    pub fn handle_revisions(
        &self,
        path: &str,
        limit: Option<usize>,
    ) -> ServerResult<Vec<RevisionEntry>> {
        let limit = limit.unwrap_or(self.config.default_revision_limit);
        Ok(self.repo.get_revisions(path, limit)?)
    }
}

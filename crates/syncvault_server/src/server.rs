//! Main sync server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;
use serde_json::json;
use std::sync::Arc;
use syncvault_protocol::{DeltaRequest, DeltaResponse, DiffRequest, DiffResponse};
use syncvault_store::Repository;
use tracing::debug;

/// The sync server.
///
/// Wraps a shared [`Repository`] with the protocol's request handlers.
/// An HTTP layer exposes endpoints that call [`dispatch`](Self::dispatch)
/// (JSON in, JSON out with status) or the typed handlers directly.
pub struct SyncServer {
    handler: RequestHandler,
}

impl SyncServer {
    /// Creates a new sync server over a repository.
    pub fn new(config: ServerConfig, repo: Arc<Repository>) -> Self {
        Self {
            handler: RequestHandler::new(config, repo),
        }
    }

    /// The typed request handlers.
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Handles a three-way reconciliation request.
    pub fn handle_diff(&self, request: DiffRequest) -> ServerResult<DiffResponse> {
        self.handler.handle_diff(request)
    }

    /// Handles an incremental pull request.
    pub fn handle_delta(&self, request: DeltaRequest) -> ServerResult<DeltaResponse> {
        self.handler.handle_delta(request)
    }

    /// JSON dispatch surface for the envelope operations.
    ///
    /// Returns the HTTP status and response body. Errors map to
    /// 404/409/4xx/500 per the protocol's status mapping, with server
    /// faults reduced to a generic message.
    pub fn dispatch(&self, path: &str, body: &[u8]) -> (u16, Vec<u8>) {
        let result = match path {
            "/sync/diff" => decode(body).and_then(|request| {
                self.handle_diff(request)
                    .and_then(|r| encode(&r))
            }),
            "/sync/delta" => decode(body).and_then(|request| {
                self.handle_delta(request)
                    .and_then(|r| encode(&r))
            }),
            _ => Err(ServerError::Store(syncvault_store::StoreError::not_found(
                format!("endpoint {path}"),
            ))),
        };

        match result {
            Ok(body) => (200, body),
            Err(e) => {
                let status = e.status_code();
                debug!(path, status, "request failed");
                let body = json!({ "error": e.public_message() });
                (status, body.to_string().into_bytes())
            }
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> ServerResult<T> {
    serde_json::from_slice(body).map_err(|e| ServerError::InvalidRequest(e.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> ServerResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| ServerError::Store(syncvault_store::StoreError::internal(e.to_string())))
}

//! # syncvault sync server
//!
//! Thin request handlers over a shared [`Repository`]: the `diff`
//! (three-way reconciliation) and `delta` (two-revision pull)
//! operations, plus file read/write/metadata/revision-listing handlers
//! that map directly onto store operations.
//!
//! The HTTP transport itself lives outside this crate; [`SyncServer`]
//! exposes typed handlers and a JSON dispatch surface with the standard
//! status mapping (404 for missing paths and revisions, 409 for
//! expected-revision mismatches, 500 for everything else, with no
//! internal detail leaked).
//!
//! [`Repository`]: syncvault_store::Repository

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use server::SyncServer;

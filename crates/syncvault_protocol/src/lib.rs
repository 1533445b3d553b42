//! # syncvault sync protocol
//!
//! Wire types shared by the store, the reconciler, and the sync server:
//!
//! - [`FileEntry`] — one file of a tree, index, or client listing
//! - [`Commit`] — one revision of the content store
//! - [`Change`] — one changed path between two revisions
//! - [`SyncAction`] — one reconciliation decision
//! - request/response envelopes for the `diff` and `delta` operations
//!
//! All types serialize to the JSON shapes consumed by sync clients.
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod change;
mod commit;
mod entry;
mod messages;

pub use action::{ActionKind, SyncAction};
pub use change::{Change, ChangeStatus};
pub use commit::{Author, Commit, RevisionEntry};
pub use entry::FileEntry;
pub use messages::{DeltaRequest, DeltaResponse, DiffRequest, DiffResponse};

//! # syncvault reconciler
//!
//! Pure three-way reconciliation between a client's file listing (left),
//! the last mutually-agreed snapshot (base), and the server's live index
//! (right):
//!
//! - [`traverse`] walks any number of sorted entry lists in a single
//!   merge-join pass, visiting each distinct path once
//! - [`what_changed`] classifies one path's left/base/right entries into
//!   at most one [`SyncAction`](syncvault_protocol::SyncAction)
//! - [`diff`] / [`diff_entries`] combine the two into an ordered,
//!   conflict-annotated action plan
//!
//! The reconciler holds no state and performs no I/O; independent calls
//! may run in parallel freely.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod error;
mod plan;
mod traverse;

pub use classify::what_changed;
pub use error::{ReconcileError, ReconcileResult};
pub use plan::{diff, diff_entries, Snapshot};
pub use traverse::traverse;

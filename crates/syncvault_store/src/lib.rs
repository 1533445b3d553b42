//! # syncvault store
//!
//! An embedded, content-addressed version store: one repository per
//! synchronized volume, holding an immutable commit history, a live
//! checkout, and an index of that checkout with real filesystem mtimes.
//!
//! The object database serializes trees, commits, diffs, and the index
//! in fixed plumbing record formats and the store layer decodes them
//! with `syncvault_record` — the same shape as driving an external
//! version-control tool, but linked in.
//!
//! ## Concurrency
//!
//! All mutating operations on one [`Repository`] serialize behind a
//! per-repository mutex. Reads are side-effect-free and may run
//! concurrently with each other and with reconciliation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use syncvault_store::{Identity, Repository};
//!
//! let repo = Repository::create(path, Identity::new("Jane", "jane@example.org"))?;
//! repo.add_file("docs/README.md", b"hello\n")?;
//! let tree = repo.get_tree("HEAD", None)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod id;
mod odb;
mod path;
mod repodir;
mod repository;
mod stream;

pub use config::Identity;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use id::{ObjectId, EMPTY_TREE_ID, ZERO_ID};
pub use repository::{PutOptions, PutOutcome, PutResult, Repository};
pub use stream::{ContentStream, ReadOptions};

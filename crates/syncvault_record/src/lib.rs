//! # syncvault record codecs
//!
//! Encoders and decoders for the fixed record formats produced by the
//! syncvault object store's plumbing layer:
//!
//! - Log records: one commit per line, seven NUL-separated fields
//! - Tree records: `<mode> <kind> <hash> <size>\t<path>`, NUL-terminated
//! - Raw diff records: `:<oldmode> <mode> <oldhash> <hash> <status>` plus
//!   NUL-terminated paths
//! - Index stanzas: a tree record followed by four `key: value` lines of
//!   filesystem metadata
//!
//! Decoding never truncates silently: malformed input yields a typed
//! [`RecordError`]. This is a pure codec crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod diff;
mod error;
mod field;
mod index;
mod log;
mod tree;

pub use diff::{
    parse_diff_records, render_diff_record, render_diff_records, DiffRecord, DiffStatus,
};
pub use error::{RecordError, RecordResult};
pub use index::{parse_index_stanzas, render_index_stanza, IndexMeta, IndexRecord};
pub use log::{parse_log, parse_log_record, render_log_record, LogRecord};
pub use tree::{parse_tree_record, parse_tree_records, render_tree_record, render_tree_records, EntryKind, TreeRecord};

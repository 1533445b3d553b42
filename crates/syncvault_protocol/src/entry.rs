//! File entries.

use serde::{Deserialize, Serialize};

/// One file of a tree, live index, or client-posted listing.
///
/// Lists of entries are always sorted ascending by path with one entry
/// per path; producers uphold this invariant and the reconciler checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the volume root.
    pub path: String,
    /// POSIX type and permission bits.
    pub mode: u32,
    /// Size in bytes.
    pub size: u64,
    /// Content hash (40-hex); path-independent.
    pub sha1: String,
    /// Modification time in epoch seconds, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
}

impl FileEntry {
    /// Creates an entry without a modification time.
    pub fn new(path: impl Into<String>, mode: u32, size: u64, sha1: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode,
            size,
            sha1: sha1.into(),
            mtime: None,
        }
    }

    /// Sets the modification time.
    #[must_use]
    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = Some(mtime);
        self
    }
}

//! Tree record codec.
//!
//! A tree record describes one entry of a recursive tree listing:
//!
//! ```text
//! <mode:6 octal> <kind> <hash:40hex> <size, right-justified to >= 7>\t<path>
//! ```
//!
//! Records are NUL-terminated. Directory entries carry the non-numeric
//! size sentinel `-`, which decodes as 0.

use crate::error::{RecordError, RecordResult};
use crate::field::{check_hash, parse_decimal, parse_mode};

/// Minimum width of the right-justified size column.
const SIZE_WIDTH: usize = 7;

/// Size sentinel reported for directory entries.
const DIR_SIZE_SENTINEL: &str = "-";

/// Kind of object a tree record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// File content.
    Blob,
    /// A nested tree.
    Tree,
}

impl EntryKind {
    fn parse(s: &str) -> RecordResult<Self> {
        match s {
            "blob" => Ok(EntryKind::Blob),
            "tree" => Ok(EntryKind::Tree),
            other => Err(RecordError::InvalidKind(other.to_string())),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Tree => "tree",
        }
    }
}

/// A decoded tree listing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRecord {
    /// POSIX type and permission bits.
    pub mode: u32,
    /// Entry kind.
    pub kind: EntryKind,
    /// Object hash.
    pub hash: String,
    /// Blob size in bytes; 0 for directories.
    pub size: u64,
    /// Path relative to the tree root.
    pub path: String,
}

/// Decodes a single tree record (without its NUL terminator).
pub fn parse_tree_record(record: &str) -> RecordResult<TreeRecord> {
    let (header, path) = record
        .split_once('\t')
        .ok_or(RecordError::MissingSeparator("TAB"))?;
    if path.is_empty() {
        return Err(RecordError::Truncated { expected: "path" });
    }

    let fields: Vec<&str> = header.split_ascii_whitespace().collect();
    if fields.len() != 4 {
        return Err(RecordError::FieldCount {
            expected: 4,
            got: fields.len(),
        });
    }

    let mode = parse_mode(fields[0])?;
    let kind = EntryKind::parse(fields[1])?;
    let hash = check_hash(fields[2])?;
    let size = if fields[3] == DIR_SIZE_SENTINEL {
        0
    } else {
        parse_decimal("size", fields[3])?
    };

    Ok(TreeRecord {
        mode,
        kind,
        hash,
        size,
        path: path.to_string(),
    })
}

/// Decodes a NUL-terminated sequence of tree records.
pub fn parse_tree_records(input: &[u8]) -> RecordResult<Vec<TreeRecord>> {
    let text = std::str::from_utf8(input).map_err(|_| RecordError::InvalidUtf8)?;
    text.split('\0')
        .filter(|chunk| !chunk.is_empty())
        .map(parse_tree_record)
        .collect()
}

/// Encodes a single tree record (without its NUL terminator).
pub fn render_tree_record(record: &TreeRecord) -> String {
    let size = match record.kind {
        EntryKind::Tree => DIR_SIZE_SENTINEL.to_string(),
        EntryKind::Blob => record.size.to_string(),
    };
    format!(
        "{:06o} {} {} {:>width$}\t{}",
        record.mode,
        record.kind.as_str(),
        record.hash,
        size,
        record.path,
        width = SIZE_WIDTH,
    )
}

/// Encodes a tree listing as NUL-terminated records.
pub fn render_tree_records(records: &[TreeRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        out.extend_from_slice(render_tree_record(record).as_bytes());
        out.push(0);
    }
    out
}

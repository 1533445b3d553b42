//! Index stanza codec.
//!
//! The live-checkout index lists one five-line stanza per file:
//!
//! ```text
//! <tree record>
//!   ctime: <sec>:<nsec>
//!   mtime: <sec>:<nsec>
//!   dev: <dev>\tino: <ino>
//!   uid: <uid>\tgid: <gid>\tflags: <flags>\tsize: <size>
//! ```
//!
//! The modification time is the 2nd colon-separated field of the mtime
//! line; the filesystem size is the 5th colon-separated field of the
//! uid/gid line.

use crate::error::{RecordError, RecordResult};
use crate::field::parse_decimal;
use crate::tree::{parse_tree_record, render_tree_record, TreeRecord};

/// Lines per index stanza.
const STANZA_LINES: usize = 5;

/// Filesystem metadata rendered into an index stanza.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexMeta {
    /// Status-change time, epoch seconds.
    pub ctime_sec: i64,
    /// Status-change time, nanosecond remainder.
    pub ctime_nsec: u32,
    /// Modification time, epoch seconds.
    pub mtime_sec: i64,
    /// Modification time, nanosecond remainder.
    pub mtime_nsec: u32,
    /// Device number.
    pub dev: u64,
    /// Inode number.
    pub ino: u64,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
    /// Entry flags.
    pub flags: u32,
    /// File size in bytes.
    pub size: u64,
}

/// A decoded index stanza: the tree record plus live filesystem metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// The committed-entry half of the stanza.
    pub entry: TreeRecord,
    /// Modification time in epoch seconds.
    pub mtime: i64,
    /// File size as reported by the filesystem.
    pub size: u64,
}

fn check_key(line: &str, key: &'static str) -> RecordResult<()> {
    if line.trim_start().starts_with(key) {
        Ok(())
    } else {
        Err(RecordError::StanzaLine {
            expected: key,
            got: line.to_string(),
        })
    }
}

fn colon_field<'a>(line: &'a str, index: usize, field: &'static str) -> RecordResult<&'a str> {
    line.split(':')
        .nth(index)
        .ok_or(RecordError::Truncated { expected: field })
}

/// Decodes a sequence of index stanzas.
pub fn parse_index_stanzas(input: &str) -> RecordResult<Vec<IndexRecord>> {
    let lines: Vec<&str> = input.lines().collect();
    if lines.len() % STANZA_LINES != 0 {
        return Err(RecordError::Truncated {
            expected: "complete 5-line stanza",
        });
    }

    let mut records = Vec::with_capacity(lines.len() / STANZA_LINES);
    for stanza in lines.chunks(STANZA_LINES) {
        let entry = parse_tree_record(stanza[0])?;
        check_key(stanza[1], "ctime:")?;
        check_key(stanza[2], "mtime:")?;
        check_key(stanza[3], "dev:")?;
        check_key(stanza[4], "uid:")?;

        // mtime seconds: 2nd colon-separated field of the mtime line.
        let mtime = parse_decimal("mtime", colon_field(stanza[2], 1, "mtime seconds")?)?;
        // filesystem size: 5th colon-separated field of the uid/gid line.
        let size = parse_decimal("size", colon_field(stanza[4], 4, "filesystem size")?)?;

        records.push(IndexRecord { entry, mtime, size });
    }

    Ok(records)
}

/// Encodes one index stanza, with trailing newline.
pub fn render_index_stanza(entry: &TreeRecord, meta: &IndexMeta) -> String {
    format!(
        "{}\n  ctime: {}:{}\n  mtime: {}:{}\n  dev: {}\tino: {}\n  uid: {}\tgid: {}\tflags: {}\tsize: {}\n",
        render_tree_record(entry),
        meta.ctime_sec,
        meta.ctime_nsec,
        meta.mtime_sec,
        meta.mtime_nsec,
        meta.dev,
        meta.ino,
        meta.uid,
        meta.gid,
        meta.flags,
        meta.size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::EntryKind;

    const HASH: &str = "557db03de997c86a4a028e1ebd3a1ceb225be238";

    fn entry() -> TreeRecord {
        TreeRecord {
            mode: 0o100644,
            kind: EntryKind::Blob,
            hash: HASH.to_string(),
            size: 6,
            path: "hello.txt".to_string(),
        }
    }

    fn meta() -> IndexMeta {
        IndexMeta {
            ctime_sec: 1438586157,
            ctime_nsec: 919313451,
            mtime_sec: 1438586158,
            mtime_nsec: 919313451,
            dev: 16777220,
            ino: 271274,
            uid: 501,
            gid: 20,
            flags: 0,
            size: 6,
        }
    }

    #[test]
    fn stanza_round_trips() {
        let text = render_index_stanza(&entry(), &meta());
        let records = parse_index_stanzas(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry, entry());
        assert_eq!(records[0].mtime, 1438586158);
        assert_eq!(records[0].size, 6);
    }

    #[test]
    fn multiple_stanzas_decode_in_order() {
        let mut second = entry();
        second.path = "world.txt".to_string();
        let text = format!(
            "{}{}",
            render_index_stanza(&entry(), &meta()),
            render_index_stanza(&second, &meta()),
        );
        let records = parse_index_stanzas(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].entry.path, "world.txt");
    }

    #[test]
    fn incomplete_stanza_fails() {
        let text = render_index_stanza(&entry(), &meta());
        let truncated: String = text.lines().take(3).collect::<Vec<_>>().join("\n");
        assert!(matches!(
            parse_index_stanzas(&truncated),
            Err(RecordError::Truncated { .. })
        ));
    }

    #[test]
    fn swapped_metadata_lines_fail() {
        let text = render_index_stanza(&entry(), &meta());
        let mut lines: Vec<&str> = text.lines().collect();
        lines.swap(1, 2);
        let swapped = lines.join("\n");
        assert!(matches!(
            parse_index_stanzas(&swapped),
            Err(RecordError::StanzaLine { .. })
        ));
    }

    #[test]
    fn garbage_mtime_fails() {
        let text = render_index_stanza(&entry(), &meta()).replace("1438586158:919313451", "later:0");
        assert!(matches!(
            parse_index_stanzas(&text),
            Err(RecordError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn empty_index_decodes_to_empty() {
        assert!(parse_index_stanzas("").unwrap().is_empty());
    }
}

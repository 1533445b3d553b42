//! Golden record vectors for the plumbing formats.
//!
//! Known-good and known-bad byte strings, pinned so format drift shows
//! up as a test failure rather than a silent incompatibility.

/// A valid log record line.
pub const LOG_RECORD: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904\01438586158\0\
d670460b4b4aece5915caf5c68d12f560a9fe3e4\0Add hello.txt\0\
0a5af0c04b1b911750cb0ddee26b8dcab286a5b3\0Jane Doe\0jane@example.org";

/// A log record with too few fields.
pub const LOG_RECORD_SHORT: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904\01438586158";

/// A valid blob tree record (without terminator).
pub const TREE_RECORD_BLOB: &str =
    "100644 blob 557db03de997c86a4a028e1ebd3a1ceb225be238      12\thello.txt";

/// A valid directory tree record with the size sentinel.
pub const TREE_RECORD_DIR: &str =
    "040000 tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904       -\tsub";

/// A tree record with a malformed mode.
pub const TREE_RECORD_BAD_MODE: &str =
    "10064x blob 557db03de997c86a4a028e1ebd3a1ceb225be238      12\thello.txt";

/// A valid raw diff modification record, with terminators.
pub const DIFF_RECORD_MODIFIED: &[u8] =
    b":100644 100644 557db03de997c86a4a028e1ebd3a1ceb225be238 \
d670460b4b4aece5915caf5c68d12f560a9fe3e4 M\0hello.txt\0";

/// A raw diff record with the invalid unmerged status.
pub const DIFF_RECORD_UNMERGED: &[u8] =
    b":100644 100644 557db03de997c86a4a028e1ebd3a1ceb225be238 \
d670460b4b4aece5915caf5c68d12f560a9fe3e4 U\0hello.txt\0";

/// A valid index stanza.
pub const INDEX_STANZA: &str = "\
100644 blob 557db03de997c86a4a028e1ebd3a1ceb225be238      12\thello.txt
  ctime: 1438586157:919313451
  mtime: 1438586158:919313451
  dev: 16777220\tino: 271274
  uid: 501\tgid: 20\tflags: 0\tsize: 12
";

#[cfg(test)]
mod tests {
    use super::*;
    use syncvault_record::{
        parse_diff_records, parse_index_stanzas, parse_log_record, parse_tree_record, DiffStatus,
        EntryKind, RecordError,
    };

    #[test]
    fn log_vector_decodes() {
        let record = parse_log_record(LOG_RECORD).unwrap();
        assert_eq!(record.subject, "Add hello.txt");
        assert_eq!(record.date, 1438586158);
        assert_eq!(record.author_email, "jane@example.org");
    }

    #[test]
    fn short_log_vector_fails() {
        assert!(matches!(
            parse_log_record(LOG_RECORD_SHORT),
            Err(RecordError::FieldCount { .. })
        ));
    }

    #[test]
    fn tree_vectors_decode() {
        let blob = parse_tree_record(TREE_RECORD_BLOB).unwrap();
        assert_eq!(blob.kind, EntryKind::Blob);
        assert_eq!(blob.size, 12);
        assert_eq!(blob.path, "hello.txt");

        let dir = parse_tree_record(TREE_RECORD_DIR).unwrap();
        assert_eq!(dir.kind, EntryKind::Tree);
        assert_eq!(dir.size, 0);
    }

    #[test]
    fn bad_mode_vector_fails() {
        assert!(matches!(
            parse_tree_record(TREE_RECORD_BAD_MODE),
            Err(RecordError::InvalidMode(_))
        ));
    }

    #[test]
    fn diff_vectors_decode() {
        let records = parse_diff_records(DIFF_RECORD_MODIFIED).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DiffStatus::Modified);
        assert_eq!(records[0].path, "hello.txt");
    }

    #[test]
    fn unmerged_diff_vector_fails() {
        assert!(matches!(
            parse_diff_records(DIFF_RECORD_UNMERGED),
            Err(RecordError::InvalidStatus(_))
        ));
    }

    #[test]
    fn index_stanza_vector_decodes() {
        let records = parse_index_stanzas(INDEX_STANZA).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mtime, 1438586158);
        assert_eq!(records[0].size, 12);
        assert_eq!(records[0].entry.path, "hello.txt");
    }
}

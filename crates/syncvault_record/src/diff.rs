//! Raw diff record codec.
//!
//! A raw diff record describes one changed path between two trees:
//!
//! ```text
//! :<oldmode:6> <mode:6> <oldhash:40> <hash:40> <status>\0<path>\0
//! ```
//!
//! Rename and copy records carry a second NUL-terminated destination path
//! after the source path, and may suffix the status letter with a
//! similarity score (e.g. `R100`), which decodes but is not retained.

use crate::error::{RecordError, RecordResult};
use crate::field::{check_hash, parse_mode};

/// Status letter of a raw diff record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    /// Path was added.
    Added,
    /// Path was copied from another path.
    Copied,
    /// Path was deleted.
    Deleted,
    /// Content was modified.
    Modified,
    /// Path was renamed.
    Renamed,
    /// Type or permission bits changed, content untouched.
    ModeChanged,
}

impl DiffStatus {
    /// Decodes a status letter. `U` and `X` are never valid here.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(DiffStatus::Added),
            'C' => Some(DiffStatus::Copied),
            'D' => Some(DiffStatus::Deleted),
            'M' => Some(DiffStatus::Modified),
            'R' => Some(DiffStatus::Renamed),
            'T' => Some(DiffStatus::ModeChanged),
            _ => None,
        }
    }

    /// The status letter.
    pub fn as_char(self) -> char {
        match self {
            DiffStatus::Added => 'A',
            DiffStatus::Copied => 'C',
            DiffStatus::Deleted => 'D',
            DiffStatus::Modified => 'M',
            DiffStatus::Renamed => 'R',
            DiffStatus::ModeChanged => 'T',
        }
    }

    /// True for statuses that carry a source path before the destination.
    pub fn has_source_path(self) -> bool {
        matches!(self, DiffStatus::Renamed | DiffStatus::Copied)
    }
}

/// A decoded raw diff record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRecord {
    /// Mode on the old side; 000000 for additions.
    pub old_mode: u32,
    /// Mode on the new side; 000000 for deletions.
    pub mode: u32,
    /// Hash on the old side; all zeros for additions.
    pub old_hash: String,
    /// Hash on the new side; all zeros for deletions.
    pub hash: String,
    /// What happened to the path.
    pub status: DiffStatus,
    /// Source path for renames and copies.
    pub old_path: Option<String>,
    /// The (destination) path.
    pub path: String,
}

fn take_until_nul<'a>(
    input: &'a [u8],
    pos: &mut usize,
    expected: &'static str,
) -> RecordResult<&'a str> {
    let rest = &input[*pos..];
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(RecordError::Truncated { expected })?;
    let text = std::str::from_utf8(&rest[..nul]).map_err(|_| RecordError::InvalidUtf8)?;
    *pos += nul + 1;
    Ok(text)
}

fn parse_status(token: &str) -> RecordResult<DiffStatus> {
    let mut chars = token.chars();
    let letter = chars
        .next()
        .ok_or(RecordError::Truncated { expected: "status" })?;
    let status =
        DiffStatus::from_char(letter).ok_or_else(|| RecordError::InvalidStatus(token.to_string()))?;
    // Optional similarity score after R/C, e.g. "R100".
    let score = chars.as_str();
    if !score.is_empty() && (!status.has_source_path() || !score.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(RecordError::InvalidStatus(token.to_string()));
    }
    Ok(status)
}

/// Decodes a sequence of raw diff records.
pub fn parse_diff_records(input: &[u8]) -> RecordResult<Vec<DiffRecord>> {
    let mut records = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        if input[pos] != b':' {
            return Err(RecordError::MissingSeparator("leading colon"));
        }
        pos += 1;

        let header = take_until_nul(input, &mut pos, "diff header")?;
        let fields: Vec<&str> = header.split_ascii_whitespace().collect();
        if fields.len() != 5 {
            return Err(RecordError::FieldCount {
                expected: 5,
                got: fields.len(),
            });
        }

        let old_mode = parse_mode(fields[0])?;
        let mode = parse_mode(fields[1])?;
        let old_hash = check_hash(fields[2])?;
        let hash = check_hash(fields[3])?;
        let status = parse_status(fields[4])?;

        let first = take_until_nul(input, &mut pos, "path")?.to_string();
        let (old_path, path) = if status.has_source_path() {
            let dest = take_until_nul(input, &mut pos, "destination path")?.to_string();
            (Some(first), dest)
        } else {
            (None, first)
        };

        records.push(DiffRecord {
            old_mode,
            mode,
            old_hash,
            hash,
            status,
            old_path,
            path,
        });
    }

    Ok(records)
}

/// Encodes a single raw diff record, including its NUL terminators.
pub fn render_diff_record(record: &DiffRecord) -> Vec<u8> {
    let status = if record.status.has_source_path() {
        format!("{}100", record.status.as_char())
    } else {
        record.status.as_char().to_string()
    };
    let mut out = format!(
        ":{:06o} {:06o} {} {} {}",
        record.old_mode, record.mode, record.old_hash, record.hash, status,
    )
    .into_bytes();
    out.push(0);
    if let Some(old_path) = &record.old_path {
        out.extend_from_slice(old_path.as_bytes());
        out.push(0);
    }
    out.extend_from_slice(record.path.as_bytes());
    out.push(0);
    out
}

/// Encodes a sequence of raw diff records.
pub fn render_diff_records(records: &[DiffRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        out.extend_from_slice(&render_diff_record(record));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: &str = "0000000000000000000000000000000000000000";
    const OLD: &str = "557db03de997c86a4a028e1ebd3a1ceb225be238";
    const NEW: &str = "d670460b4b4aece5915caf5c68d12f560a9fe3e4";

    fn record(header: &str, paths: &[&str]) -> Vec<u8> {
        let mut out = header.as_bytes().to_vec();
        out.push(0);
        for p in paths {
            out.extend_from_slice(p.as_bytes());
            out.push(0);
        }
        out
    }

    #[test]
    fn parses_modification() {
        let input = record(&format!(":100644 100644 {OLD} {NEW} M"), &["notes.txt"]);
        let records = parse_diff_records(&input).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.status, DiffStatus::Modified);
        assert_eq!(r.old_hash, OLD);
        assert_eq!(r.hash, NEW);
        assert_eq!(r.old_path, None);
        assert_eq!(r.path, "notes.txt");
    }

    #[test]
    fn parses_addition_with_zero_side() {
        let input = record(&format!(":000000 100644 {ZERO} {NEW} A"), &["new.txt"]);
        let r = &parse_diff_records(&input).unwrap()[0];
        assert_eq!(r.status, DiffStatus::Added);
        assert_eq!(r.old_mode, 0);
        assert_eq!(r.old_hash, ZERO);
    }

    #[test]
    fn rename_keeps_both_paths() {
        let input = record(
            &format!(":100644 100644 {OLD} {OLD} R100"),
            &["old/name.txt", "new/name.txt"],
        );
        let r = &parse_diff_records(&input).unwrap()[0];
        assert_eq!(r.status, DiffStatus::Renamed);
        assert_eq!(r.old_path.as_deref(), Some("old/name.txt"));
        assert_eq!(r.path, "new/name.txt");
    }

    #[test]
    fn copy_keeps_both_paths() {
        let input = record(
            &format!(":100644 100644 {OLD} {OLD} C100"),
            &["a.txt", "a copy.txt"],
        );
        let r = &parse_diff_records(&input).unwrap()[0];
        assert_eq!(r.status, DiffStatus::Copied);
        assert_eq!(r.old_path.as_deref(), Some("a.txt"));
        assert_eq!(r.path, "a copy.txt");
    }

    #[test]
    fn unmerged_and_unknown_statuses_fail() {
        for status in ["U", "X"] {
            let input = record(&format!(":100644 100644 {OLD} {NEW} {status}"), &["p"]);
            assert!(matches!(
                parse_diff_records(&input),
                Err(RecordError::InvalidStatus(_))
            ));
        }
    }

    #[test]
    fn score_on_non_rename_fails() {
        let input = record(&format!(":100644 100644 {OLD} {NEW} M100"), &["p"]);
        assert!(matches!(
            parse_diff_records(&input),
            Err(RecordError::InvalidStatus(_))
        ));
    }

    #[test]
    fn truncated_path_fails() {
        let mut input = record(&format!(":100644 100644 {OLD} {NEW} M"), &[]);
        input.extend_from_slice(b"half-a-path");
        assert!(matches!(
            parse_diff_records(&input),
            Err(RecordError::Truncated { .. })
        ));
    }

    #[test]
    fn missing_colon_fails() {
        let input = record(&format!("100644 100644 {OLD} {NEW} M"), &["p"]);
        assert!(matches!(
            parse_diff_records(&input),
            Err(RecordError::MissingSeparator(_))
        ));
    }

    #[test]
    fn records_round_trip() {
        let records = vec![
            DiffRecord {
                old_mode: 0,
                mode: 0o100644,
                old_hash: ZERO.to_string(),
                hash: NEW.to_string(),
                status: DiffStatus::Added,
                old_path: None,
                path: "added.txt".to_string(),
            },
            DiffRecord {
                old_mode: 0o100644,
                mode: 0o100644,
                old_hash: OLD.to_string(),
                hash: OLD.to_string(),
                status: DiffStatus::Renamed,
                old_path: Some("from.txt".to_string()),
                path: "to.txt".to_string(),
            },
        ];
        let bytes = render_diff_records(&records);
        assert_eq!(parse_diff_records(&bytes).unwrap(), records);
    }
}

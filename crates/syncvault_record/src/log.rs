//! Log record codec.
//!
//! A log record describes one commit on a single line as seven
//! NUL-separated fields: tree hash, commit date (decimal epoch seconds),
//! parent hash (empty for a root commit), subject, commit hash, author
//! name, author email.

use crate::error::{RecordError, RecordResult};
use crate::field::{check_hash, parse_decimal};

/// Number of NUL-separated fields in a log record.
const LOG_FIELDS: usize = 7;

/// A decoded commit log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Hash of the commit's tree.
    pub tree: String,
    /// Commit date in epoch seconds.
    pub date: i64,
    /// Hash of the parent commit, if any.
    pub parent: Option<String>,
    /// Commit subject line.
    pub subject: String,
    /// Hash of the commit itself.
    pub commit: String,
    /// Author name.
    pub author_name: String,
    /// Author email.
    pub author_email: String,
}

/// Decodes a single log record line.
pub fn parse_log_record(line: &str) -> RecordResult<LogRecord> {
    let fields: Vec<&str> = line.split('\0').collect();
    if fields.len() != LOG_FIELDS {
        return Err(RecordError::FieldCount {
            expected: LOG_FIELDS,
            got: fields.len(),
        });
    }

    let parent = if fields[2].is_empty() {
        None
    } else {
        Some(check_hash(fields[2])?)
    };

    Ok(LogRecord {
        tree: check_hash(fields[0])?,
        date: parse_decimal("commit date", fields[1])?,
        parent,
        subject: fields[3].to_string(),
        commit: check_hash(fields[4])?,
        author_name: fields[5].to_string(),
        author_email: fields[6].to_string(),
    })
}

/// Decodes a newline-separated sequence of log records, newest first.
pub fn parse_log(input: &str) -> RecordResult<Vec<LogRecord>> {
    input
        .lines()
        .filter(|line| !line.is_empty())
        .map(parse_log_record)
        .collect()
}

/// Encodes a log record as a single line (without trailing newline).
pub fn render_log_record(record: &LogRecord) -> String {
    format!(
        "{}\0{}\0{}\0{}\0{}\0{}\0{}",
        record.tree,
        record.date,
        record.parent.as_deref().unwrap_or(""),
        record.subject,
        record.commit,
        record.author_name,
        record.author_email,
    )
}

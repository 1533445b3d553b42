//! Error types for record decoding.

use thiserror::Error;

/// Result type for record decoding.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur while decoding plumbing records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record ended before a required part was read.
    #[error("truncated record: expected {expected}")]
    Truncated {
        /// What was expected next.
        expected: &'static str,
    },

    /// Wrong number of fields in a NUL-separated record.
    #[error("field count mismatch: expected {expected}, got {got}")]
    FieldCount {
        /// Required field count.
        expected: usize,
        /// Fields actually present.
        got: usize,
    },

    /// A mode field is not six octal digits.
    #[error("invalid mode: {0:?}")]
    InvalidMode(String),

    /// A hash field is not 40 lowercase hex digits.
    #[error("invalid object hash: {0:?}")]
    InvalidHash(String),

    /// A tree record names an unknown entry kind.
    #[error("invalid entry kind: {0:?}")]
    InvalidKind(String),

    /// A raw diff record carries a status letter outside {A,C,D,M,R,T}.
    #[error("invalid diff status: {0:?}")]
    InvalidStatus(String),

    /// A numeric field failed to parse.
    #[error("invalid number in {field}: {value:?}")]
    InvalidNumber {
        /// Which field was being decoded.
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// A required separator or terminator is missing.
    #[error("missing {0} in record")]
    MissingSeparator(&'static str),

    /// Text was expected but the bytes are not valid UTF-8.
    #[error("record is not valid UTF-8")]
    InvalidUtf8,

    /// An index stanza line does not carry the expected key.
    #[error("malformed index stanza: expected {expected} line, got {got:?}")]
    StanzaLine {
        /// The key the line should start with.
        expected: &'static str,
        /// The line actually seen.
        got: String,
    },
}

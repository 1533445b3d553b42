//! Shared field validators for record decoding.

use crate::error::{RecordError, RecordResult};

/// Returns true if `s` is exactly 40 lowercase hex digits.
pub(crate) fn is_hex40(s: &str) -> bool {
    s.len() == 40
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Validates a 40-hex hash field.
pub(crate) fn check_hash(s: &str) -> RecordResult<String> {
    if is_hex40(s) {
        Ok(s.to_string())
    } else {
        Err(RecordError::InvalidHash(s.to_string()))
    }
}

/// Parses a six-octal-digit mode field.
pub(crate) fn parse_mode(s: &str) -> RecordResult<u32> {
    if s.len() != 6 || !s.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(RecordError::InvalidMode(s.to_string()));
    }
    u32::from_str_radix(s, 8).map_err(|_| RecordError::InvalidMode(s.to_string()))
}

/// Parses a decimal integer field.
pub(crate) fn parse_decimal<T: std::str::FromStr>(
    field: &'static str,
    s: &str,
) -> RecordResult<T> {
    s.trim().parse().map_err(|_| RecordError::InvalidNumber {
        field,
        value: s.to_string(),
    })
}

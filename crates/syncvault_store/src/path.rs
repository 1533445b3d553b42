//! Path canonicalization.
//!
//! Every path argument is normalized before use: leading slashes and `.`
//! segments drop out, `..` pops the previous segment. A path that would
//! climb above the checkout root is rejected.

use crate::error::{StoreError, StoreResult};

/// Canonicalizes a path relative to the checkout root.
///
/// Returns the empty string for the root itself.
pub(crate) fn canonicalize(path: &str) -> StoreResult<String> {
    // NUL would corrupt the NUL-terminated record formats, newline the
    // line-based ones (paths appear in commit subjects).
    if path.contains('\0') || path.contains('\n') {
        return Err(StoreError::invalid_path(path));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(StoreError::invalid_path(path));
                }
            }
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// Canonicalizes a path that must name a file, not the root.
pub(crate) fn canonicalize_file(path: &str) -> StoreResult<String> {
    let canonical = canonicalize(path)?;
    if canonical.is_empty() {
        return Err(StoreError::invalid_path(path));
    }
    Ok(canonical)
}

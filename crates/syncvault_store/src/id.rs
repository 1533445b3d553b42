//! Content-addressed object identifiers.

use crate::error::{StoreError, StoreResult};
use sha1::{Digest, Sha1};
use std::fmt;

/// Hash of the empty tree. Falls out of hashing `tree 0\0`.
pub const EMPTY_TREE_ID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// All-zero hash used for absent sides of a diff record.
pub const ZERO_ID: &str = "0000000000000000000000000000000000000000";

/// A 40-hex SHA-1 object identifier.
///
/// Identifiers hash the object body behind a `<kind> <len>\0` header, so
/// blob ids are compatible with a git object store and identical content
/// always yields identical identifiers regardless of path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Computes the identifier of an object body.
    pub fn hash(kind: &str, body: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(format!("{} {}\0", kind, body.len()).as_bytes());
        hasher.update(body);
        Self(hex::encode(hasher.finalize()))
    }

    /// Computes a blob identifier.
    pub fn for_blob(content: &[u8]) -> Self {
        Self::hash("blob", content)
    }

    /// Parses a 40-hex identifier.
    pub fn parse(s: &str) -> StoreResult<Self> {
        let valid = s.len() == 40
            && s.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(StoreError::internal(format!("invalid object id: {s:?}")))
        }
    }

    /// The identifier as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Repository configuration.

use serde::{Deserialize, Serialize};

/// Current repository format version.
pub(crate) const FORMAT_VERSION: u32 = 1;

/// Author identity stamped onto every commit of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Identity {
    /// Creates an identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Persisted per-repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RepoConfig {
    /// On-disk format version.
    pub format_version: u32,
    /// Commit author identity.
    pub author: Identity,
}

impl RepoConfig {
    pub(crate) fn new(author: Identity) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            author,
        }
    }
}

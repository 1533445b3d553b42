//! Commits and revision listings.

use serde::{Deserialize, Serialize};

/// Commit author identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// One revision of the content store. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit hash.
    pub sha1: String,
    /// Hash of the commit's tree.
    #[serde(rename = "treeSha1")]
    pub tree_sha1: String,
    /// Commit date in epoch seconds.
    #[serde(rename = "commitDate")]
    pub commit_date: i64,
    /// Parent commit hash; absent for the root commit.
    #[serde(rename = "parentSha1", skip_serializing_if = "Option::is_none")]
    pub parent_sha1: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Author identity.
    pub author: Author,
}

/// One entry of a per-path revision listing: the commit plus the byte
/// size the path had at that revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEntry {
    /// The commit that touched the path.
    #[serde(flatten)]
    pub commit: Commit,
    /// Blob size in bytes at this revision.
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit() -> Commit {
        Commit {
            sha1: "d6".repeat(20),
            tree_sha1: "4b".repeat(20),
            commit_date: 1438586158,
            parent_sha1: None,
            subject: "Add README".to_string(),
            author: Author {
                name: "Jane Doe".to_string(),
                email: "jane@example.org".to_string(),
            },
        }
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(&commit()).unwrap();
        assert!(json.get("treeSha1").is_some());
        assert!(json.get("commitDate").is_some());
        assert!(json.get("parentSha1").is_none());
        assert_eq!(json["author"]["name"], "Jane Doe");
    }

    #[test]
    fn revision_entry_flattens_commit() {
        let entry = RevisionEntry {
            commit: commit(),
            size: 42,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["size"], 42);
        assert!(json.get("sha1").is_some());
    }
}

//! Changes between two revisions.

use serde::{Deserialize, Serialize};

/// What happened to a path between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeStatus {
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
    /// Only type or permission bits changed.
    ModeChanged,
}

/// One changed path between two revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// What happened.
    pub status: ChangeStatus,
    /// Mode on the old side; 0 for additions.
    #[serde(rename = "oldMode")]
    pub old_mode: u32,
    /// Mode on the new side; 0 for deletions.
    pub mode: u32,
    /// Content hash on the old side; all zeros for additions.
    #[serde(rename = "oldRev")]
    pub old_hash: String,
    /// Content hash on the new side; all zeros for deletions.
    #[serde(rename = "rev")]
    pub hash: String,
    /// Source path for renames and copies.
    #[serde(rename = "oldPath", skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    /// The (destination) path.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_value(ChangeStatus::ModeChanged).unwrap();
        assert_eq!(json, "MODECHANGED");
        let json = serde_json::to_value(ChangeStatus::Added).unwrap();
        assert_eq!(json, "ADDED");
    }

    #[test]
    fn hashes_use_rev_wire_names() {
        let change = Change {
            status: ChangeStatus::Renamed,
            old_mode: 0o100644,
            mode: 0o100644,
            old_hash: "ab".repeat(20),
            hash: "ab".repeat(20),
            old_path: Some("from.txt".to_string()),
            path: "to.txt".to_string(),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert!(json.get("oldRev").is_some());
        assert!(json.get("rev").is_some());
        assert_eq!(json["oldPath"], "from.txt");
        assert_eq!(json["status"], "RENAMED");
    }
}

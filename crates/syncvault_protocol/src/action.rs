//! Reconciliation actions.

use serde::{Deserialize, Serialize};

/// The kind of synchronization action a client must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Upload a file that is new on the client.
    Add,
    /// Upload client content over the server's copy.
    Update,
    /// Delete the path on the server.
    Remove,
    /// Fetch the server's copy.
    Download,
    /// Delete the path on the client.
    Unlink,
}

/// One reconciliation decision for a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAction {
    /// What to do.
    pub action: ActionKind,
    /// The affected path.
    pub path: String,
    /// Content hash the action refers to.
    pub sha1: String,
    /// True when both sides diverged and one was chosen.
    pub conflict: bool,
}

impl SyncAction {
    /// Creates an action.
    pub fn new(
        action: ActionKind,
        path: impl Into<String>,
        sha1: impl Into<String>,
        conflict: bool,
    ) -> Self {
        Self {
            action,
            path: path.into(),
            sha1: sha1.into(),
            conflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ActionKind::Download).unwrap(),
            "download"
        );
        assert_eq!(serde_json::to_value(ActionKind::Unlink).unwrap(), "unlink");
    }

    #[test]
    fn action_round_trips() {
        let action = SyncAction::new(ActionKind::Update, "a.txt", "ab".repeat(20), true);
        let json = serde_json::to_string(&action).unwrap();
        let back: SyncAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}

//! Reconciliation planning: traversal plus classification.

use crate::classify::what_changed;
use crate::error::ReconcileResult;
use crate::traverse::traverse;
use syncvault_protocol::{FileEntry, SyncAction};

/// A tree snapshot handed to reconciliation: the revision it was taken
/// at plus its sorted entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Revision the entries were listed from; empty for the empty tree.
    pub revision: String,
    /// Entries sorted ascending by path.
    pub entries: Vec<FileEntry>,
}

impl Snapshot {
    /// Creates a snapshot.
    pub fn new(revision: impl Into<String>, entries: Vec<FileEntry>) -> Self {
        Self {
            revision: revision.into(),
            entries,
        }
    }
}

/// Reconciles three tree snapshots into an ordered action plan.
pub fn diff(left: &Snapshot, base: &Snapshot, right: &Snapshot) -> ReconcileResult<Vec<SyncAction>> {
    diff_entries(&left.entries, &base.entries, &right.entries)
}

/// Reconciles three raw entry lists into an ordered action plan.
///
/// Actions come back strictly ascending by path. Inputs must be sorted
/// ascending with unique paths.
pub fn diff_entries(
    left: &[FileEntry],
    base: &[FileEntry],
    right: &[FileEntry],
) -> ReconcileResult<Vec<SyncAction>> {
    let mut actions = Vec::new();
    traverse(&[left, base, right], |row| {
        if let Some(action) = what_changed(row[0], row[1], row[2])? {
            actions.push(action);
        }
        Ok(())
    })?;
    Ok(actions)
}

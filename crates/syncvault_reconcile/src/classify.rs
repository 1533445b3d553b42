//! Three-way change classification for a single path.

use crate::error::{ReconcileError, ReconcileResult};
use syncvault_protocol::{ActionKind, FileEntry, SyncAction};

/// mtime used for comparison when an entry has none.
const MTIME_ABSENT: i64 = 0;

fn mtime(entry: &FileEntry) -> i64 {
    entry.mtime.unwrap_or(MTIME_ABSENT)
}

fn action(kind: ActionKind, entry: &FileEntry, conflict: bool) -> Option<SyncAction> {
    Some(SyncAction::new(kind, &entry.path, &entry.sha1, conflict))
}

/// Classifies what changed for one path across the three sides.
///
/// `left` is the client's entry, `base` the last-agreed snapshot's, and
/// `right` the server's. Any of them may be absent except all three at
/// once. Returns the action the client must perform, or `None` when the
/// sides already agree.
///
/// When both sides changed the same path, the newer mtime wins and the
/// action is flagged as a conflict; an absent mtime compares as 0.
pub fn what_changed(
    left: Option<&FileEntry>,
    base: Option<&FileEntry>,
    right: Option<&FileEntry>,
) -> ReconcileResult<Option<SyncAction>> {
    let decision = match (left, base, right) {
        (None, None, None) => return Err(ReconcileError::AllAbsent),

        // Deleted on both sides independently.
        (None, Some(_), None) => None,

        // Only the server has it.
        (None, None, Some(r)) => action(ActionKind::Download, r, false),

        // Client deleted; server kept or changed it.
        (None, Some(b), Some(r)) => {
            if b.sha1 == r.sha1 {
                action(ActionKind::Remove, r, false)
            } else {
                action(ActionKind::Download, r, true)
            }
        }

        // Only the client has it.
        (Some(l), None, None) => action(ActionKind::Add, l, false),

        // Present everywhere.
        (Some(l), Some(b), Some(r)) => {
            if l.sha1 == r.sha1 {
                None
            } else if b.sha1 == r.sha1 {
                // Only the client moved forward; push its content under
                // the server's path.
                Some(SyncAction::new(
                    ActionKind::Update,
                    &r.path,
                    &l.sha1,
                    false,
                ))
            } else if mtime(l) > mtime(r) {
                action(ActionKind::Update, l, true)
            } else {
                action(ActionKind::Download, r, true)
            }
        }

        // Created independently on both sides.
        (Some(l), None, Some(r)) => {
            if l.sha1 == r.sha1 {
                None
            } else if mtime(l) > mtime(r) {
                action(ActionKind::Update, l, true)
            } else {
                action(ActionKind::Download, r, true)
            }
        }

        // Server deleted; client kept or changed it.
        (Some(l), Some(b), None) => {
            if b.sha1 == l.sha1 {
                action(ActionKind::Unlink, l, false)
            } else {
                action(ActionKind::Add, l, true)
            }
        }
    };

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, hash: &str, mtime: i64) -> FileEntry {
        FileEntry::new(path, 0o100644, 1, hash.repeat(20)).with_mtime(mtime)
    }

    #[test]
    fn all_absent_is_invalid() {
        assert_eq!(what_changed(None, None, None), Err(ReconcileError::AllAbsent));
    }

    #[test]
    fn deleted_on_both_sides_is_settled() {
        let b = entry("a", "aa", 10);
        assert_eq!(what_changed(None, Some(&b), None).unwrap(), None);
    }

    #[test]
    fn server_only_entry_downloads() {
        let r = entry("a", "aa", 10);
        let action = what_changed(None, None, Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Download);
        assert!(!action.conflict);
    }

    #[test]
    fn clean_client_delete_removes() {
        let b = entry("a", "aa", 10);
        let r = entry("a", "aa", 10);
        let action = what_changed(None, Some(&b), Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Remove);
        assert!(!action.conflict);
    }

    #[test]
    fn delete_vs_server_edit_downloads_with_conflict() {
        let b = entry("a", "aa", 10);
        let r = entry("a", "bb", 20);
        let action = what_changed(None, Some(&b), Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Download);
        assert!(action.conflict);
    }

    #[test]
    fn client_only_entry_adds() {
        let l = entry("a", "aa", 10);
        let action = what_changed(Some(&l), None, None).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Add);
        assert!(!action.conflict);
    }

    #[test]
    fn identical_content_needs_nothing() {
        let l = entry("a", "aa", 10);
        let b = entry("a", "00", 5);
        let r = entry("a", "aa", 20);
        assert_eq!(what_changed(Some(&l), Some(&b), Some(&r)).unwrap(), None);
    }

    #[test]
    fn client_only_edit_updates_cleanly() {
        // Base and right agree, so only the client moved forward.
        let l = entry("a", "ff", 30);
        let b = entry("a", "00", 10);
        let r = entry("a", "00", 10);
        let action = what_changed(Some(&l), Some(&b), Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Update);
        assert_eq!(action.sha1, "ff".repeat(20));
        assert!(!action.conflict);
    }

    #[test]
    fn divergent_edit_newer_client_wins() {
        let l = entry("a", "ff", 50);
        let b = entry("a", "00", 10);
        let r = entry("a", "bb", 20);
        let action = what_changed(Some(&l), Some(&b), Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Update);
        assert!(action.conflict);
    }

    #[test]
    fn divergent_edit_newer_server_wins() {
        let l = entry("a", "ff", 10);
        let b = entry("a", "00", 5);
        let r = entry("a", "bb", 50);
        let action = what_changed(Some(&l), Some(&b), Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Download);
        assert_eq!(action.sha1, "bb".repeat(20));
        assert!(action.conflict);
    }

    #[test]
    fn independent_identical_creates_need_nothing() {
        let l = entry("a", "aa", 10);
        let r = entry("a", "aa", 99);
        assert_eq!(what_changed(Some(&l), None, Some(&r)).unwrap(), None);
    }

    #[test]
    fn independent_creates_tie_break_on_mtime() {
        let l = entry("a", "ff", 50);
        let r = entry("a", "bb", 20);
        let action = what_changed(Some(&l), None, Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Update);
        assert!(action.conflict);

        let action = what_changed(Some(&r), None, Some(&l)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Download);
        assert!(action.conflict);
    }

    #[test]
    fn clean_server_delete_unlinks() {
        let l = entry("a", "aa", 10);
        let b = entry("a", "aa", 10);
        let action = what_changed(Some(&l), Some(&b), None).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Unlink);
        assert!(!action.conflict);
    }

    #[test]
    fn server_delete_vs_client_edit_re_adds() {
        let l = entry("a", "ff", 30);
        let b = entry("a", "aa", 10);
        let action = what_changed(Some(&l), Some(&b), None).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Add);
        assert!(action.conflict);
    }

    #[test]
    fn absent_mtime_compares_as_zero() {
        let mut l = entry("a", "ff", 0);
        l.mtime = None;
        let r = entry("a", "bb", 1);
        // Right has a real mtime, so it wins the tie-break.
        let action = what_changed(Some(&l), None, Some(&r)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Download);

        // Neither has one: equal mtimes fall through to download.
        let mut r2 = entry("a", "bb", 0);
        r2.mtime = None;
        let action = what_changed(Some(&l), None, Some(&r2)).unwrap().unwrap();
        assert_eq!(action.action, ActionKind::Download);
        assert!(action.conflict);
    }
}

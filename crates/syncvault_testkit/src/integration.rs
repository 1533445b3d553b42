//! Cross-crate scenario tests: repository, reconciler, and server
//! working together.

use crate::fixtures::{with_test_repo, TestRepo};
use crate::generators::entry_list_strategy;
use proptest::prelude::*;
use syncvault_protocol::{ActionKind, DiffRequest, FileEntry};
use syncvault_reconcile::{diff_entries, what_changed, ReconcileError};
use syncvault_store::{ObjectId, PutOptions, PutOutcome, StoreError};

fn entry(path: &str, hash: &str, mtime: i64) -> FileEntry {
    FileEntry::new(path, 0o100644, 1, hash.repeat(20)).with_mtime(mtime)
}

#[test]
fn scenario_new_server_file_downloads() {
    // left=[], base=[], right=[A] => download A without conflict.
    let right = vec![entry("A", "11", 5)];
    let actions = diff_entries(&[], &[], &right).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action, ActionKind::Download);
    assert_eq!(actions[0].path, "A");
    assert_eq!(actions[0].sha1, "11".repeat(20));
    assert!(!actions[0].conflict);
}

#[test]
fn scenario_local_edit_updates_without_conflict() {
    // Client edited A; base and server still agree.
    let left = vec![entry("A", "ff", 30)];
    let base = vec![entry("A", "00", 10)];
    let right = vec![entry("A", "00", 10)];
    let actions = diff_entries(&left, &base, &right).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action, ActionKind::Update);
    assert_eq!(actions[0].sha1, "ff".repeat(20));
    assert!(!actions[0].conflict);
}

#[test]
fn scenario_divergent_edit_downloads_newer_server_copy() {
    let left = vec![entry("A", "ff", 10)];
    let base = vec![entry("A", "00", 5)];
    let right = vec![entry("A", "bb", 50)];
    let actions = diff_entries(&left, &base, &right).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action, ActionKind::Download);
    assert_eq!(actions[0].sha1, "bb".repeat(20));
    assert!(actions[0].conflict);
}

#[test]
fn scenario_clean_client_delete_removes() {
    let base = vec![entry("B", "55", 1)];
    let right = vec![entry("B", "55", 1)];
    let actions = diff_entries(&[], &base, &right).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action, ActionKind::Remove);
    assert_eq!(actions[0].path, "B");
    assert!(!actions[0].conflict);
}

#[test]
fn scenario_content_addressing_is_path_independent() {
    with_test_repo(|repo| {
        repo.add_file("README", b"shared bytes").unwrap();
        repo.add_file("README2", b"shared bytes").unwrap();
        let tree = repo.get_tree("HEAD", None).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].sha1, tree[1].sha1);
        assert_eq!(tree[0].sha1, ObjectId::for_blob(b"shared bytes").as_str());
    });
}

#[test]
fn scenario_remove_missing_creates_no_commit() {
    with_test_repo(|repo| {
        let before = repo.head().unwrap();
        assert!(matches!(
            repo.remove_file("missing", None),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(repo.head().unwrap(), before);
    });
}

#[test]
fn sync_cycle_converges() {
    let fixture = TestRepo::new();
    let server = fixture.server();
    fixture.add_file("notes.txt", b"server version").unwrap();

    // First sync: the client downloads everything.
    let response = server
        .handle_diff(DiffRequest {
            client_index: vec![],
            last_sync_revision: String::new(),
        })
        .unwrap();
    assert_eq!(response.changes.len(), 1);
    assert_eq!(response.changes[0].action, ActionKind::Download);
    let synced_revision = response.server_revision;

    // The client applies the download; its index now mirrors the
    // server. A re-sync against the recorded revision is settled.
    let client_index = fixture.index_entries(None).unwrap();
    let response = server
        .handle_diff(DiffRequest {
            client_index,
            last_sync_revision: synced_revision,
        })
        .unwrap();
    assert!(response.changes.is_empty());
}

#[test]
fn upload_conflicts_surface_as_new_paths() {
    let fixture = TestRepo::new();
    fixture.add_file("doc.txt", b"server copy").unwrap();

    // A client that based its edit on a stale revision uploads.
    let namer = |path: &str| format!("{path}.client");
    let result = fixture
        .put_file(
            "doc.txt",
            b"client copy",
            PutOptions {
                conflict_namer: Some(&namer),
                ..PutOptions::default()
            },
        )
        .unwrap();
    assert_eq!(
        result.outcome,
        PutOutcome::Diverged {
            conflict_path: "doc.txt.client".to_string()
        }
    );

    // Both copies are now committed and visible to the next diff.
    let tree = fixture.get_tree("HEAD", None).unwrap();
    let paths: Vec<&str> = tree.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["doc.txt", "doc.txt.client"]);
}

#[test]
fn repeated_unchanged_upload_is_idempotent() {
    let fixture = TestRepo::new();
    fixture.add_file("doc.txt", b"stable").unwrap();
    for _ in 0..3 {
        let result = fixture
            .put_file("doc.txt", b"stable", PutOptions::default())
            .unwrap();
        assert_eq!(result.outcome, PutOutcome::Unchanged);
        let entry = fixture.file_entry("doc.txt", "HEAD").unwrap();
        assert_eq!(entry.sha1, ObjectId::for_blob(b"stable").as_str());
    }
}

proptest! {
    /// The classifier is total over every combination with at least one
    /// side present.
    #[test]
    fn classifier_is_total(
        left in proptest::option::of(entry_list_strategy(1)),
        base in proptest::option::of(entry_list_strategy(1)),
        right in proptest::option::of(entry_list_strategy(1)),
    ) {
        let pick = |side: &Option<Vec<FileEntry>>| {
            side.as_ref().and_then(|list| list.first()).cloned()
        };
        let (l, b, r) = (pick(&left), pick(&base), pick(&right));
        let result = what_changed(l.as_ref(), b.as_ref(), r.as_ref());
        if l.is_none() && b.is_none() && r.is_none() {
            prop_assert_eq!(result, Err(ReconcileError::AllAbsent));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Reconciling a tree with itself yields no actions.
    #[test]
    fn identity_reconciliation_is_empty(tree in entry_list_strategy(16)) {
        let actions = diff_entries(&tree, &tree, &tree).unwrap();
        prop_assert!(actions.is_empty());
    }

    /// Actions always come back strictly ascending by path.
    #[test]
    fn actions_are_strictly_ordered(
        left in entry_list_strategy(16),
        base in entry_list_strategy(16),
        right in entry_list_strategy(16),
    ) {
        let actions = diff_entries(&left, &base, &right).unwrap();
        for pair in actions.windows(2) {
            prop_assert!(pair[0].path < pair[1].path);
        }
    }

    /// Unsorted input is rejected up front.
    #[test]
    fn unsorted_input_is_rejected(mut list in entry_list_strategy(8)) {
        prop_assume!(list.len() >= 2);
        list.reverse();
        let result = diff_entries(&list, &[], &[]);
        prop_assert!(
            matches!(result, Err(ReconcileError::UnsortedInput { .. })),
            "expected UnsortedInput error"
        );
    }
}

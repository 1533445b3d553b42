//! Merge-join traversal over sorted entry lists.

use crate::error::{ReconcileError, ReconcileResult};
use syncvault_protocol::FileEntry;

fn validate_sorted(lists: &[&[FileEntry]]) -> ReconcileResult<()> {
    for (index, list) in lists.iter().enumerate() {
        for pair in list.windows(2) {
            if pair[0].path >= pair[1].path {
                return Err(ReconcileError::UnsortedInput {
                    list: index,
                    path: pair[1].path.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Walks any number of sorted entry lists in one merge-join pass.
///
/// Keeps one cursor per list and repeatedly visits the lexicographically
/// smallest path among the non-exhausted cursors, handing the visitor one
/// `Option<&FileEntry>` per list (`Some` where that list has the path).
/// Cursors advance only on the lists that matched, so every distinct path
/// is visited exactly once, in ascending order.
///
/// Each input list must be strictly sorted ascending by path; this is
/// checked up front and violations fail with
/// [`ReconcileError::UnsortedInput`].
pub fn traverse<F>(lists: &[&[FileEntry]], mut visit: F) -> ReconcileResult<()>
where
    F: FnMut(&[Option<&FileEntry>]) -> ReconcileResult<()>,
{
    validate_sorted(lists)?;

    let mut cursors = vec![0usize; lists.len()];
    let mut row: Vec<Option<&FileEntry>> = Vec::with_capacity(lists.len());

    loop {
        let mut smallest: Option<&str> = None;
        for (index, list) in lists.iter().enumerate() {
            if let Some(entry) = list.get(cursors[index]) {
                if smallest.is_none_or(|s| entry.path.as_str() < s) {
                    smallest = Some(&entry.path);
                }
            }
        }
        let Some(path) = smallest else {
            return Ok(());
        };

        row.clear();
        for (index, list) in lists.iter().enumerate() {
            row.push(list.get(cursors[index]).filter(|entry| entry.path == path));
        }
        visit(&row)?;

        for (index, list) in lists.iter().enumerate() {
            if list
                .get(cursors[index])
                .is_some_and(|entry| entry.path == path)
            {
                cursors[index] += 1;
            }
        }
    }
}

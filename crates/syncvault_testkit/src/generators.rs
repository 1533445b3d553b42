//! Property-based test generators using proptest.
//!
//! Provides strategies for generating entry lists that maintain the
//! sorted-unique-paths invariant the reconciler requires.

use proptest::prelude::*;
use std::collections::BTreeMap;
use syncvault_protocol::FileEntry;

/// Strategy for generating valid entry paths.
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}(/[a-z]{1,8}){0,2}").expect("Invalid regex")
}

/// Strategy for generating 40-hex content hashes.
pub fn hash_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9a-f]{40}").expect("Invalid regex")
}

/// Strategy for generating one entry at a fixed path.
pub fn entry_strategy(path: String) -> impl Strategy<Value = FileEntry> {
    (hash_strategy(), 0u64..4096, proptest::option::of(0i64..1_000_000)).prop_map(
        move |(hash, size, mtime)| FileEntry {
            path: path.clone(),
            mode: 0o100644,
            size,
            sha1: hash,
            mtime,
        },
    )
}

/// Strategy for generating a sorted, duplicate-free entry list.
pub fn entry_list_strategy(max_len: usize) -> impl Strategy<Value = Vec<FileEntry>> {
    prop::collection::btree_map(
        path_strategy(),
        (hash_strategy(), 0u64..4096, proptest::option::of(0i64..1_000_000)),
        0..max_len,
    )
    .prop_map(|map: BTreeMap<String, (String, u64, Option<i64>)>| {
        map.into_iter()
            .map(|(path, (hash, size, mtime))| FileEntry {
                path,
                mode: 0o100644,
                size,
                sha1: hash,
                mtime,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_lists_are_sorted_and_unique(list in entry_list_strategy(16)) {
            for pair in list.windows(2) {
                prop_assert!(pair[0].path < pair[1].path);
            }
        }

        #[test]
        fn generated_hashes_are_forty_hex(hash in hash_strategy()) {
            prop_assert_eq!(hash.len(), 40);
            prop_assert!(hash.bytes().all(|b| b.is_ascii_hexdigit()));
        }
    }
}

//! Repository facade.
//!
//! A [`Repository`] is one synchronized volume: an object database, a
//! live checkout, and a linear commit history. Every mutation produces
//! exactly one commit. Mutations serialize behind a per-repository
//! mutex because the intermediate checkout state is externally
//! observable; reads run concurrently without locking.

use crate::config::{Identity, RepoConfig};
use crate::error::{StoreError, StoreResult};
use crate::id::{ObjectId, EMPTY_TREE_ID};
use crate::odb::{CommitObj, ObjectDb};
use crate::path::{canonicalize, canonicalize_file};
use crate::repodir::RepoDir;
use crate::stream::{self, ContentStream, ReadOptions};
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use syncvault_protocol::{Author, Change, ChangeStatus, Commit, FileEntry, RevisionEntry};
use syncvault_record::{
    parse_diff_records, parse_log, parse_log_record, parse_tree_records, render_index_stanza,
    DiffRecord, DiffStatus, EntryKind, IndexMeta, LogRecord, TreeRecord,
};
use tracing::{debug, info};

/// Symbolic name of the current head revision.
pub(crate) const HEAD_REV: &str = "HEAD";

/// Wildcard accepted by expected-revision guards.
const REV_WILDCARD: &str = "*";

/// Mode bits for regular committed files.
const FILE_MODE: u32 = 0o100644;

/// Mode bits for the synthesized root directory entry.
const DIR_MODE: u32 = 0o040000;

/// Outcome of a merge-aware upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// No entry existed; the content was added.
    Added,
    /// The entry matched the parent revision (or overwrite was set);
    /// the content replaced it.
    Updated,
    /// The content was byte-identical; a no-op commit was recorded.
    Unchanged,
    /// Both sides diverged; the content was added under a conflict path.
    Diverged {
        /// Path the content landed under.
        conflict_path: String,
    },
}

/// Result of [`Repository::put_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutResult {
    /// What happened.
    pub outcome: PutOutcome,
    /// The commit recording it.
    pub commit: Commit,
}

/// Options for [`Repository::put_file`].
pub struct PutOptions<'a> {
    /// Replace the existing entry regardless of its revision.
    pub overwrite: bool,
    /// Blob revision the client based its content on.
    pub parent_revision: Option<&'a str>,
    /// Names the conflict path for diverged uploads; a timestamped
    /// default is used when absent.
    pub conflict_namer: Option<&'a dyn Fn(&str) -> String>,
}

impl Default for PutOptions<'_> {
    fn default() -> Self {
        Self {
            overwrite: false,
            parent_revision: None,
            conflict_namer: None,
        }
    }
}

/// One synchronized volume backed by a content-addressed commit history.
pub struct Repository {
    dir: RepoDir,
    odb: ObjectDb,
    config: RepoConfig,
    /// Serializes all mutating operations on this repository.
    write_lock: Mutex<()>,
}

impl Repository {
    /// Initializes an empty repository bound to an author identity.
    ///
    /// Creates the directory layout, persists the identity, and records
    /// an initial commit of the empty tree.
    pub fn create(path: &Path, identity: Identity) -> StoreResult<Self> {
        let dir = RepoDir::open(path, true)?;
        if dir.is_initialized() {
            return Err(StoreError::AlreadyExists(path.display().to_string()));
        }

        let config = RepoConfig::new(identity);
        dir.save_config(&config)?;

        let odb = ObjectDb::open(dir.objects_root());
        let repo = Self {
            dir,
            odb,
            config,
            write_lock: Mutex::new(()),
        };

        let tree = repo.odb.put_tree(&[])?;
        let commit = CommitObj {
            tree,
            date: epoch_now(),
            parent: None,
            subject: "Initialize repository".to_string(),
            author_name: repo.config.author.name.clone(),
            author_email: repo.config.author.email.clone(),
        };
        let id = repo.odb.put_commit(&commit)?;
        repo.dir.set_head(&id)?;
        repo.dir.write_index("")?;

        info!(repo = %path.display(), head = %id, "created repository");
        Ok(repo)
    }

    /// Opens an existing repository.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let dir = RepoDir::open(path, false)?;
        if !dir.is_initialized() {
            return Err(StoreError::not_found("repository HEAD"));
        }
        let config = dir.load_config()?;
        let odb = ObjectDb::open(dir.objects_root());
        Ok(Self {
            dir,
            odb,
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// The author identity stamped onto commits.
    pub fn identity(&self) -> &Identity {
        &self.config.author
    }

    /// The current head revision.
    pub fn head(&self) -> StoreResult<String> {
        Ok(self.dir.head()?.as_str().to_string())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Looks up a commit by revision. Fails with `NotFound` for an
    /// unknown revision.
    pub fn get_commit(&self, revision: &str) -> StoreResult<Commit> {
        let id = self.resolve_commit(revision)?;
        let line = self.odb.log_line(&id)?;
        Ok(commit_from_record(&parse_log_record(&line)?))
    }

    /// Recursive file listing of a committed tree, optionally filtered
    /// to a subtree. Revision `""` denotes the empty tree.
    pub fn get_tree(&self, revision: &str, path: Option<&str>) -> StoreResult<Vec<FileEntry>> {
        if revision.is_empty() {
            return Ok(Vec::new());
        }
        let prefix = match path {
            Some(p) => canonicalize(p)?,
            None => String::new(),
        };
        let id = self.resolve_commit(revision)?;
        let commit = self.odb.read_commit(&id)?;
        let records = parse_tree_records(&self.odb.ls_tree(&commit.tree)?)?;
        Ok(records
            .into_iter()
            .filter(|r| in_subtree(&r.path, &prefix))
            .map(entry_from_record)
            .collect())
    }

    /// Looks up one entry of a committed tree.
    ///
    /// The root path resolves to an entry synthesized from the commit's
    /// tree hash, with directory mode and size 0. The mtime is resolved
    /// only against HEAD-like revisions, through a secondary
    /// last-commit-touching-this-path lookup.
    pub fn file_entry(&self, path: &str, revision: &str) -> StoreResult<FileEntry> {
        let canonical = canonicalize(path)?;
        let id = self.resolve_commit(revision)?;
        let head = self.dir.head()?;
        let head_like = revision == HEAD_REV || id == head;
        let commit = self.odb.read_commit(&id)?;

        if canonical.is_empty() {
            let mut entry = FileEntry::new("", DIR_MODE, 0, commit.tree.as_str());
            if head_like {
                entry.mtime = self.last_touch(&head, None)?;
            }
            return Ok(entry);
        }

        let records = parse_tree_records(&self.odb.ls_tree(&commit.tree)?)?;
        let record = records
            .iter()
            .find(|r| r.path == canonical)
            .ok_or_else(|| StoreError::not_found(canonical.clone()))?;
        let mut entry = entry_from_record(record.clone());
        if head_like {
            entry.mtime = self.last_touch(&head, Some(&canonical))?;
        }
        Ok(entry)
    }

    /// Streams a committed blob's bytes. Resolution is lazy; see
    /// [`ContentStream`]. Must be called within a tokio runtime.
    pub fn read_stream(&self, path: &str, options: ReadOptions) -> ContentStream {
        stream::spawn_read(
            self.odb.clone(),
            self.dir.head_path(),
            path.to_string(),
            options,
        )
    }

    /// Per-path revision history, newest first and rename-aware, each
    /// entry annotated with the blob's byte size at that revision.
    pub fn get_revisions(&self, path: &str, limit: usize) -> StoreResult<Vec<RevisionEntry>> {
        let canonical = canonicalize_file(path)?;
        let head = self.dir.head()?;
        let log = parse_log(&self.odb.log(&head, None)?)?;

        let mut hits: Vec<(LogRecord, ObjectId)> = Vec::new();
        let mut target = canonical;
        for (i, record) in log.iter().enumerate() {
            if hits.len() >= limit {
                break;
            }
            let changes = self.commit_changes(record, log.get(i + 1))?;
            for change in &changes {
                if change.path == target && change.status != DiffStatus::Deleted {
                    hits.push((record.clone(), ObjectId::parse(&change.hash)?));
                    if change.status == DiffStatus::Renamed {
                        if let Some(old) = &change.old_path {
                            target = old.clone();
                        }
                    }
                    break;
                }
            }
        }

        // One batch size lookup over all blobs, not one per commit.
        let ids: Vec<ObjectId> = hits.iter().map(|(_, id)| id.clone()).collect();
        let sizes = self.odb.batch_sizes(&ids)?;
        Ok(hits
            .into_iter()
            .map(|(record, blob)| RevisionEntry {
                size: sizes.get(blob.as_str()).copied().unwrap_or(0),
                commit: commit_from_record(&record),
            })
            .collect())
    }

    /// Changed paths between two revisions. `from = ""` denotes the
    /// empty tree.
    pub fn diff_tree(&self, from: &str, to: &str) -> StoreResult<Vec<Change>> {
        let from_tree = self.tree_of(from)?;
        let to_tree = self.tree_of(to)?;
        let records = parse_diff_records(&self.odb.diff_raw(&from_tree, &to_tree)?)?;
        Ok(records.iter().map(change_from_record).collect())
    }

    /// Entries of the live checkout with real filesystem mtimes - the
    /// canonical right-hand side of a reconciliation.
    pub fn index_entries(&self, path: Option<&str>) -> StoreResult<Vec<FileEntry>> {
        let prefix = match path {
            Some(p) => canonicalize(p)?,
            None => String::new(),
        };
        let stanzas = syncvault_record::parse_index_stanzas(&self.dir.read_index()?)?;
        Ok(stanzas
            .into_iter()
            .filter(|s| in_subtree(&s.entry.path, &prefix))
            .map(|s| {
                let mtime = s.mtime;
                entry_from_record(s.entry).with_mtime(mtime)
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Adds a file. The path must be absent.
    pub fn add_file(&self, path: &str, content: &[u8]) -> StoreResult<Commit> {
        let canonical = canonicalize_file(path)?;
        let _guard = self.write_lock.lock();
        let mut records = self.head_tree_records()?;
        self.add_locked(&mut records, &canonical, content)
    }

    /// Replaces a file's content. The path must be present.
    pub fn update_file(&self, path: &str, content: &[u8]) -> StoreResult<Commit> {
        let canonical = canonicalize_file(path)?;
        let _guard = self.write_lock.lock();
        let mut records = self.head_tree_records()?;
        self.update_locked(&mut records, &canonical, content)
    }

    /// Removes a file. The optional guard compares against the current
    /// entry's blob revision; `"*"` matches anything.
    pub fn remove_file(&self, path: &str, expected_revision: Option<&str>) -> StoreResult<Commit> {
        let canonical = canonicalize_file(path)?;
        let _guard = self.write_lock.lock();
        let mut records = self.head_tree_records()?;
        let index = find_index(&records, &canonical)
            .ok_or_else(|| StoreError::not_found(canonical.clone()))?;
        check_guard(expected_revision, &records[index].hash)?;

        records.remove(index);
        self.remove_checkout_file(&canonical)?;
        self.commit_records(&records, format!("Remove {canonical}"))
    }

    /// Renames a file, with the same guard semantics as
    /// [`remove_file`](Self::remove_file).
    pub fn move_file(
        &self,
        from: &str,
        to: &str,
        expected_revision: Option<&str>,
    ) -> StoreResult<Commit> {
        let from_c = canonicalize_file(from)?;
        let to_c = canonicalize_file(to)?;
        let _guard = self.write_lock.lock();
        let mut records = self.head_tree_records()?;
        let index =
            find_index(&records, &from_c).ok_or_else(|| StoreError::not_found(from_c.clone()))?;
        check_guard(expected_revision, &records[index].hash)?;
        if find_index(&records, &to_c).is_some() {
            return Err(StoreError::AlreadyExists(to_c));
        }

        let mut entry = records.remove(index);
        entry.path = to_c.clone();
        insert_entry(&mut records, entry);

        let from_path = self.dir.checkout_path(&from_c);
        let to_path = self.dir.checkout_path(&to_c);
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from_path, &to_path)?;
        self.prune_empty_dirs(&from_c);

        self.commit_records(&records, format!("Move {from_c} to {to_c}"))
    }

    /// Duplicates a file's content under a new path, with the same
    /// guard semantics as [`remove_file`](Self::remove_file).
    pub fn copy_file(
        &self,
        from: &str,
        to: &str,
        expected_revision: Option<&str>,
    ) -> StoreResult<Commit> {
        let from_c = canonicalize_file(from)?;
        let to_c = canonicalize_file(to)?;
        let _guard = self.write_lock.lock();
        let mut records = self.head_tree_records()?;
        let index =
            find_index(&records, &from_c).ok_or_else(|| StoreError::not_found(from_c.clone()))?;
        check_guard(expected_revision, &records[index].hash)?;
        if find_index(&records, &to_c).is_some() {
            return Err(StoreError::AlreadyExists(to_c));
        }

        let mut entry = records[index].clone();
        entry.path = to_c.clone();
        insert_entry(&mut records, entry);

        let to_path = self.dir.checkout_path(&to_c);
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(self.dir.checkout_path(&from_c), &to_path)?;

        self.commit_records(&records, format!("Copy {from_c} to {to_c}"))
    }

    /// Merge-aware upload, the optimistic-concurrency write primitive
    /// of the sync protocol.
    ///
    /// - no existing entry: behaves as add (a set `parent_revision` is
    ///   `InvalidParent`)
    /// - existing entry matching `parent_revision`, or `overwrite`:
    ///   behaves as update
    /// - otherwise the new content is hashed: identical content records
    ///   a no-op "Unchanged" commit, diverged content is added under a
    ///   conflict path
    pub fn put_file(
        &self,
        path: &str,
        content: &[u8],
        options: PutOptions<'_>,
    ) -> StoreResult<PutResult> {
        let canonical = canonicalize_file(path)?;
        let _guard = self.write_lock.lock();
        let mut records = self.head_tree_records()?;

        let existing = find_index(&records, &canonical).map(|i| records[i].clone());
        let Some(existing) = existing else {
            if options.parent_revision.is_some() {
                return Err(StoreError::InvalidParent(canonical));
            }
            let commit = self.add_locked(&mut records, &canonical, content)?;
            return Ok(PutResult {
                outcome: PutOutcome::Added,
                commit,
            });
        };

        if options.overwrite || options.parent_revision == Some(existing.hash.as_str()) {
            let commit = self.update_locked(&mut records, &canonical, content)?;
            return Ok(PutResult {
                outcome: PutOutcome::Updated,
                commit,
            });
        }

        let incoming = ObjectId::for_blob(content);
        if incoming.as_str() == existing.hash {
            let commit = self.unchanged_commit(&records, &canonical)?;
            return Ok(PutResult {
                outcome: PutOutcome::Unchanged,
                commit,
            });
        }

        let conflict_path = match options.conflict_namer {
            Some(namer) => namer(&canonical),
            None => default_conflict_path(&canonical),
        };
        let conflict_c = canonicalize_file(&conflict_path)?;
        debug!(path = %canonical, conflict = %conflict_c, "diverged upload");
        let commit = self.add_locked(&mut records, &conflict_c, content)?;
        Ok(PutResult {
            outcome: PutOutcome::Diverged {
                conflict_path: conflict_c,
            },
            commit,
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn resolve_commit(&self, revision: &str) -> StoreResult<ObjectId> {
        if revision == HEAD_REV {
            return self.dir.head();
        }
        let id = ObjectId::parse(revision)
            .map_err(|_| StoreError::not_found(format!("revision {revision}")))?;
        self.odb
            .read_commit(&id)
            .map_err(|_| StoreError::not_found(format!("revision {revision}")))?;
        Ok(id)
    }

    fn tree_of(&self, revision: &str) -> StoreResult<ObjectId> {
        if revision.is_empty() {
            return ObjectId::parse(EMPTY_TREE_ID);
        }
        let id = self.resolve_commit(revision)?;
        Ok(self.odb.read_commit(&id)?.tree)
    }

    fn head_tree_records(&self) -> StoreResult<Vec<TreeRecord>> {
        let head = self.dir.head()?;
        let commit = self.odb.read_commit(&head)?;
        Ok(parse_tree_records(&self.odb.ls_tree(&commit.tree)?)?)
    }

    /// Raw diff records of one commit against its parent (or the empty
    /// tree for the root commit).
    fn commit_changes(
        &self,
        record: &LogRecord,
        parent: Option<&LogRecord>,
    ) -> StoreResult<Vec<DiffRecord>> {
        let parent_tree = match parent {
            Some(p) => ObjectId::parse(&p.tree)?,
            None => ObjectId::parse(EMPTY_TREE_ID)?,
        };
        let tree = ObjectId::parse(&record.tree)?;
        Ok(parse_diff_records(&self.odb.diff_raw(&parent_tree, &tree)?)?)
    }

    /// Date of the newest commit touching `path`, or the head commit's
    /// date for the root.
    fn last_touch(&self, head: &ObjectId, path: Option<&str>) -> StoreResult<Option<i64>> {
        let log = parse_log(&self.odb.log(head, None)?)?;
        let Some(target) = path else {
            return Ok(log.first().map(|r| r.date));
        };
        for (i, record) in log.iter().enumerate() {
            let changes = self.commit_changes(record, log.get(i + 1))?;
            if changes
                .iter()
                .any(|c| c.path == target || c.old_path.as_deref() == Some(target))
            {
                return Ok(Some(record.date));
            }
        }
        Ok(None)
    }

    fn add_locked(
        &self,
        records: &mut Vec<TreeRecord>,
        canonical: &str,
        content: &[u8],
    ) -> StoreResult<Commit> {
        if find_index(records, canonical).is_some() {
            return Err(StoreError::AlreadyExists(canonical.to_string()));
        }
        let blob = self.odb.put_blob(content)?;
        insert_entry(
            records,
            TreeRecord {
                mode: FILE_MODE,
                kind: EntryKind::Blob,
                hash: blob.as_str().to_string(),
                size: content.len() as u64,
                path: canonical.to_string(),
            },
        );
        self.write_checkout_file(canonical, content)?;
        self.commit_records(records, format!("Add {canonical}"))
    }

    fn update_locked(
        &self,
        records: &mut [TreeRecord],
        canonical: &str,
        content: &[u8],
    ) -> StoreResult<Commit> {
        let index = find_index(records, canonical)
            .ok_or_else(|| StoreError::not_found(canonical.to_string()))?;
        let blob = self.odb.put_blob(content)?;
        records[index].hash = blob.as_str().to_string();
        records[index].size = content.len() as u64;
        self.write_checkout_file(canonical, content)?;
        self.commit_records(records, format!("Update {canonical}"))
    }

    /// Records a no-op "Unchanged" commit. A repeat within the same
    /// whole second collapses onto the prior commit, an artifact of the
    /// store's second-resolution commit dates.
    fn unchanged_commit(&self, records: &[TreeRecord], canonical: &str) -> StoreResult<Commit> {
        let subject = format!("Unchanged {canonical}");
        let head = self.dir.head()?;
        let head_commit = self.odb.read_commit(&head)?;
        if head_commit.subject == subject && head_commit.date == epoch_now() {
            return Ok(commit_from_record(&head_commit.to_log_record(&head)));
        }
        self.commit_records(records, subject)
    }

    /// Writes the tree, the commit, the new HEAD, and the rebuilt index.
    fn commit_records(&self, records: &[TreeRecord], subject: String) -> StoreResult<Commit> {
        let tree = self.odb.put_tree(records)?;
        let parent = self.dir.head()?;
        let commit = CommitObj {
            tree,
            date: epoch_now(),
            parent: Some(parent),
            subject,
            author_name: self.config.author.name.clone(),
            author_email: self.config.author.email.clone(),
        };
        let id = self.odb.put_commit(&commit)?;
        self.dir.set_head(&id)?;
        self.dir.write_index(&self.build_index(records)?)?;
        debug!(commit = %id, subject = %commit.subject, "committed");
        Ok(commit_from_record(&commit.to_log_record(&id)))
    }

    fn build_index(&self, records: &[TreeRecord]) -> StoreResult<String> {
        let mut out = String::new();
        for record in records {
            let meta = index_meta_for(&self.dir.checkout_path(&record.path), record.size)?;
            out.push_str(&render_index_stanza(record, &meta));
        }
        Ok(out)
    }

    fn write_checkout_file(&self, canonical: &str, content: &[u8]) -> StoreResult<()> {
        let path = self.dir.checkout_path(canonical);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(())
    }

    fn remove_checkout_file(&self, canonical: &str) -> StoreResult<()> {
        let path = self.dir.checkout_path(canonical);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.prune_empty_dirs(canonical);
        Ok(())
    }

    /// Removes now-empty ancestor directories of a deleted checkout
    /// path. Stops at the first non-empty directory.
    fn prune_empty_dirs(&self, canonical: &str) {
        let root = self.dir.checkout_root();
        let mut dir = self.dir.checkout_path(canonical);
        while dir.pop() {
            if dir == root || fs::remove_dir(&dir).is_err() {
                break;
            }
        }
    }
}

fn epoch_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn in_subtree(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || (path.len() > prefix.len() && path.starts_with(prefix) && path.as_bytes()[prefix.len()] == b'/')
}

fn find_index(records: &[TreeRecord], path: &str) -> Option<usize> {
    records
        .binary_search_by(|r| r.path.as_str().cmp(path))
        .ok()
}

fn insert_entry(records: &mut Vec<TreeRecord>, record: TreeRecord) {
    match records.binary_search_by(|r| r.path.as_str().cmp(&record.path)) {
        Ok(i) => records[i] = record,
        Err(i) => records.insert(i, record),
    }
}

fn check_guard(expected: Option<&str>, actual: &str) -> StoreResult<()> {
    match expected {
        Some(rev) if rev != REV_WILDCARD && rev != actual => Err(StoreError::OutOfDate {
            expected: rev.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

fn default_conflict_path(canonical: &str) -> String {
    let stamp = epoch_now();
    match canonical.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => {
            format!("{stem}-conflict-{stamp}.{ext}")
        }
        _ => format!("{canonical}-conflict-{stamp}"),
    }
}

fn entry_from_record(record: TreeRecord) -> FileEntry {
    FileEntry::new(record.path, record.mode, record.size, record.hash)
}

fn commit_from_record(record: &LogRecord) -> Commit {
    Commit {
        sha1: record.commit.clone(),
        tree_sha1: record.tree.clone(),
        commit_date: record.date,
        parent_sha1: record.parent.clone(),
        subject: record.subject.clone(),
        author: Author {
            name: record.author_name.clone(),
            email: record.author_email.clone(),
        },
    }
}

fn change_from_record(record: &DiffRecord) -> Change {
    let status = match record.status {
        DiffStatus::Added => ChangeStatus::Added,
        DiffStatus::Copied => ChangeStatus::Copied,
        DiffStatus::Deleted => ChangeStatus::Deleted,
        DiffStatus::Modified => ChangeStatus::Modified,
        DiffStatus::Renamed => ChangeStatus::Renamed,
        DiffStatus::ModeChanged => ChangeStatus::ModeChanged,
    };
    Change {
        status,
        old_mode: record.old_mode,
        mode: record.mode,
        old_hash: record.old_hash.clone(),
        hash: record.hash.clone(),
        old_path: record.old_path.clone(),
        path: record.path.clone(),
    }
}

#[cfg(unix)]
fn index_meta_for(path: &Path, size: u64) -> StoreResult<IndexMeta> {
    use std::os::unix::fs::MetadataExt;
    let md = fs::metadata(path)?;
    Ok(IndexMeta {
        ctime_sec: md.ctime(),
        ctime_nsec: md.ctime_nsec() as u32,
        mtime_sec: md.mtime(),
        mtime_nsec: md.mtime_nsec() as u32,
        dev: md.dev(),
        ino: md.ino(),
        uid: md.uid(),
        gid: md.gid(),
        flags: 0,
        size,
    })
}

#[cfg(not(unix))]
fn index_meta_for(path: &Path, size: u64) -> StoreResult<IndexMeta> {
    let md = fs::metadata(path)?;
    let mtime = md
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(IndexMeta {
        mtime_sec: mtime,
        size,
        ..IndexMeta::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_repo(temp: &tempfile::TempDir) -> Repository {
        Repository::create(
            &temp.path().join("vol"),
            Identity::new("Jane Doe", "jane@example.org"),
        )
        .unwrap()
    }

    #[test]
    fn create_records_an_initial_commit() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let head = repo.get_commit(HEAD_REV).unwrap();
        assert_eq!(head.tree_sha1, EMPTY_TREE_ID);
        assert_eq!(head.parent_sha1, None);
        assert_eq!(head.author.name, "Jane Doe");
        assert!(repo.get_tree(HEAD_REV, None).unwrap().is_empty());
    }

    #[test]
    fn create_twice_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("vol");
        let repo = Repository::create(&path, Identity::new("a", "a@b")).unwrap();
        drop(repo);
        assert!(matches!(
            Repository::create(&path, Identity::new("a", "a@b")),
            Err(StoreError::AlreadyExists(_))
        ));
        let _reopened = Repository::open(&path).unwrap();
    }

    #[test]
    fn add_and_read_back() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let commit = repo.add_file("docs/README.md", b"hello\n").unwrap();
        assert_eq!(commit.subject, "Add docs/README.md");

        let tree = repo.get_tree(HEAD_REV, None).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].path, "docs/README.md");
        assert_eq!(tree[0].sha1, ObjectId::for_blob(b"hello\n").as_str());
        assert_eq!(tree[0].size, 6);

        // The checkout mirrors the commit.
        let on_disk = fs::read(temp.path().join("vol/checkout/docs/README.md")).unwrap();
        assert_eq!(on_disk, b"hello\n");
    }

    #[test]
    fn add_existing_path_fails() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"one").unwrap();
        assert!(matches!(
            repo.add_file("a.txt", b"two"),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn identical_content_hashes_identically_across_paths() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("README", b"same bytes").unwrap();
        repo.add_file("README2", b"same bytes").unwrap();
        let tree = repo.get_tree(HEAD_REV, None).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].sha1, tree[1].sha1);
    }

    #[test]
    fn update_requires_presence() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        assert!(matches!(
            repo.update_file("missing.txt", b"x"),
            Err(StoreError::NotFound(_))
        ));

        repo.add_file("a.txt", b"one").unwrap();
        let commit = repo.update_file("a.txt", b"two").unwrap();
        assert_eq!(commit.subject, "Update a.txt");
        let entry = repo.file_entry("a.txt", HEAD_REV).unwrap();
        assert_eq!(entry.sha1, ObjectId::for_blob(b"two").as_str());
    }

    #[test]
    fn remove_missing_fails_without_a_commit() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let before = repo.head().unwrap();
        assert!(matches!(
            repo.remove_file("missing.txt", None),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(repo.head().unwrap(), before);
    }

    #[test]
    fn remove_honors_the_revision_guard() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"one").unwrap();
        let actual = ObjectId::for_blob(b"one");

        let stale = "0".repeat(40);
        assert!(matches!(
            repo.remove_file("a.txt", Some(stale.as_str())),
            Err(StoreError::OutOfDate { .. })
        ));
        // Wildcard always matches.
        repo.remove_file("a.txt", Some("*")).unwrap();
        assert!(repo.get_tree(HEAD_REV, None).unwrap().is_empty());

        repo.add_file("a.txt", b"one").unwrap();
        repo.remove_file("a.txt", Some(actual.as_str())).unwrap();
        assert!(repo.get_tree(HEAD_REV, None).unwrap().is_empty());
    }

    #[test]
    fn move_renames_entry_and_checkout() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("old/name.txt", b"payload").unwrap();
        let commit = repo.move_file("old/name.txt", "new/name.txt", None).unwrap();
        assert_eq!(commit.subject, "Move old/name.txt to new/name.txt");

        let tree = repo.get_tree(HEAD_REV, None).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].path, "new/name.txt");
        assert!(temp.path().join("vol/checkout/new/name.txt").exists());
        assert!(!temp.path().join("vol/checkout/old").exists());
    }

    #[test]
    fn copy_duplicates_content() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"payload").unwrap();
        repo.copy_file("a.txt", "b.txt", None).unwrap();

        let tree = repo.get_tree(HEAD_REV, None).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].sha1, tree[1].sha1);
        assert!(temp.path().join("vol/checkout/a.txt").exists());
        assert!(temp.path().join("vol/checkout/b.txt").exists());
    }

    #[test]
    fn move_to_occupied_path_fails() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"one").unwrap();
        repo.add_file("b.txt", b"two").unwrap();
        assert!(matches!(
            repo.move_file("a.txt", "b.txt", None),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn paths_may_not_escape_the_checkout() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        assert!(matches!(
            repo.add_file("../outside.txt", b"x"),
            Err(StoreError::InvalidPath(_))
        ));
        assert!(matches!(
            repo.file_entry("a/../../b", HEAD_REV),
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn unknown_revision_is_not_found() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        assert!(matches!(
            repo.get_commit(&"ab".repeat(20)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.get_commit("not-a-revision"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn empty_revision_is_the_empty_tree() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"one").unwrap();
        assert!(repo.get_tree("", None).unwrap().is_empty());

        let changes = repo.diff_tree("", HEAD_REV).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, ChangeStatus::Added);
        assert_eq!(changes[0].path, "a.txt");
    }

    #[test]
    fn file_entry_synthesizes_the_root() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"one").unwrap();
        let head = repo.get_commit(HEAD_REV).unwrap();

        let root = repo.file_entry("/", HEAD_REV).unwrap();
        assert_eq!(root.mode, DIR_MODE);
        assert_eq!(root.size, 0);
        assert_eq!(root.sha1, head.tree_sha1);
        assert_eq!(root.mtime, Some(head.commit_date));
    }

    #[test]
    fn file_entry_mtime_only_for_head_like_revisions() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let first = repo.add_file("a.txt", b"one").unwrap();
        repo.add_file("b.txt", b"two").unwrap();

        // Resolved against HEAD (symbolically or by id): mtime present,
        // dated by the commit that last touched the path.
        let entry = repo.file_entry("a.txt", HEAD_REV).unwrap();
        assert_eq!(entry.mtime, Some(first.commit_date));
        let head_id = repo.head().unwrap();
        assert!(repo.file_entry("a.txt", &head_id).unwrap().mtime.is_some());

        // Against an older revision: absent.
        let entry = repo.file_entry("a.txt", &first.sha1).unwrap();
        assert_eq!(entry.mtime, None);
    }

    #[test]
    fn subtree_listing_filters_by_prefix() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("docs/a.md", b"a").unwrap();
        repo.add_file("docs/sub/b.md", b"b").unwrap();
        repo.add_file("docsother/c.md", b"c").unwrap();

        let docs = repo.get_tree(HEAD_REV, Some("docs")).unwrap();
        let paths: Vec<&str> = docs.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["docs/a.md", "docs/sub/b.md"]);
    }

    #[test]
    fn index_entries_carry_real_mtimes() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"one").unwrap();
        repo.add_file("dir/b.txt", b"two").unwrap();

        let entries = repo.index_entries(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.mtime.is_some()));
        assert_eq!(entries[0].path, "a.txt");

        let scoped = repo.index_entries(Some("dir")).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].path, "dir/b.txt");
    }

    #[test]
    fn diff_tree_between_revisions() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let first = repo.add_file("a.txt", b"one").unwrap();
        repo.update_file("a.txt", b"one changed").unwrap();
        repo.add_file("b.txt", b"two").unwrap();

        let changes = repo.diff_tree(&first.sha1, HEAD_REV).unwrap();
        let statuses: Vec<(ChangeStatus, &str)> = changes
            .iter()
            .map(|c| (c.status, c.path.as_str()))
            .collect();
        assert_eq!(
            statuses,
            [
                (ChangeStatus::Modified, "a.txt"),
                (ChangeStatus::Added, "b.txt")
            ]
        );
    }

    #[test]
    fn diff_tree_reports_renames_with_old_path() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let before = repo.add_file("old.txt", b"payload").unwrap();
        repo.move_file("old.txt", "new.txt", None).unwrap();

        let changes = repo.diff_tree(&before.sha1, HEAD_REV).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, ChangeStatus::Renamed);
        assert_eq!(changes[0].old_path.as_deref(), Some("old.txt"));
        assert_eq!(changes[0].path, "new.txt");
    }

    #[test]
    fn revisions_are_newest_first_with_sizes() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"v1").unwrap();
        repo.update_file("a.txt", b"v2 longer").unwrap();
        repo.add_file("unrelated.txt", b"x").unwrap();

        let revisions = repo.get_revisions("a.txt", 10).unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[0].commit.subject, "Update a.txt");
        assert_eq!(revisions[0].size, 9);
        assert_eq!(revisions[1].commit.subject, "Add a.txt");
        assert_eq!(revisions[1].size, 2);
    }

    #[test]
    fn revisions_follow_renames() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("old.txt", b"payload").unwrap();
        repo.move_file("old.txt", "new.txt", None).unwrap();

        let revisions = repo.get_revisions("new.txt", 10).unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[0].commit.subject, "Move old.txt to new.txt");
        assert_eq!(revisions[1].commit.subject, "Add old.txt");
    }

    #[test]
    fn revisions_honor_the_limit() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"v1").unwrap();
        repo.update_file("a.txt", b"v2").unwrap();
        repo.update_file("a.txt", b"v3").unwrap();

        let revisions = repo.get_revisions("a.txt", 2).unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[0].commit.subject, "Update a.txt");
    }

    #[test]
    fn put_adds_when_absent() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let result = repo
            .put_file("a.txt", b"one", PutOptions::default())
            .unwrap();
        assert_eq!(result.outcome, PutOutcome::Added);

        // A parent revision without an existing entry is invalid.
        let parent = "ab".repeat(20);
        let err = repo
            .put_file(
                "b.txt",
                b"x",
                PutOptions {
                    parent_revision: Some(parent.as_str()),
                    ..PutOptions::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidParent(_)));
    }

    #[test]
    fn put_updates_on_matching_parent_or_overwrite() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"one").unwrap();
        let parent = ObjectId::for_blob(b"one");

        let result = repo
            .put_file(
                "a.txt",
                b"two",
                PutOptions {
                    parent_revision: Some(parent.as_str()),
                    ..PutOptions::default()
                },
            )
            .unwrap();
        assert_eq!(result.outcome, PutOutcome::Updated);

        let result = repo
            .put_file(
                "a.txt",
                b"three",
                PutOptions {
                    overwrite: true,
                    ..PutOptions::default()
                },
            )
            .unwrap();
        assert_eq!(result.outcome, PutOutcome::Updated);
        let entry = repo.file_entry("a.txt", HEAD_REV).unwrap();
        assert_eq!(entry.sha1, ObjectId::for_blob(b"three").as_str());
    }

    #[test]
    fn put_unchanged_content_is_idempotent() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"same").unwrap();

        let first = repo
            .put_file("a.txt", b"same", PutOptions::default())
            .unwrap();
        assert_eq!(first.outcome, PutOutcome::Unchanged);
        let second = repo
            .put_file("a.txt", b"same", PutOptions::default())
            .unwrap();
        assert_eq!(second.outcome, PutOutcome::Unchanged);

        // Within the same second the repeat collapses onto the prior
        // commit; across a second boundary it chains onto it.
        assert!(
            second.commit.sha1 == first.commit.sha1
                || second.commit.parent_sha1.as_deref() == Some(first.commit.sha1.as_str())
        );

        let entry = repo.file_entry("a.txt", HEAD_REV).unwrap();
        assert_eq!(entry.sha1, ObjectId::for_blob(b"same").as_str());
    }

    #[test]
    fn put_diverged_content_lands_on_a_conflict_path() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"server copy").unwrap();

        let namer = |path: &str| format!("{path}.conflicted");
        let result = repo
            .put_file(
                "a.txt",
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
                conflict_path: "a.txt.conflicted".to_string()
            }
        );

        // Original untouched, conflict copy holds the new bytes.
        let original = repo.file_entry("a.txt", HEAD_REV).unwrap();
        assert_eq!(original.sha1, ObjectId::for_blob(b"server copy").as_str());
        let conflicted = repo.file_entry("a.txt.conflicted", HEAD_REV).unwrap();
        assert_eq!(conflicted.sha1, ObjectId::for_blob(b"client copy").as_str());
    }

    #[tokio::test]
    async fn read_stream_yields_committed_bytes() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        repo.add_file("a.txt", b"streamed content").unwrap();

        let stream = repo.read_stream("a.txt", ReadOptions::default());
        assert_eq!(stream.read_to_end().await.unwrap(), b"streamed content");
    }

    #[tokio::test]
    async fn read_stream_errors_lazily_for_missing_paths() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);

        let mut stream = repo.read_stream("missing.txt", ReadOptions::default());
        let first = stream.recv().await.unwrap();
        assert!(matches!(first, Err(StoreError::NotFound(_))));
        assert!(stream.recv().await.is_none());

        let mut stream = repo.read_stream(
            "missing.txt",
            ReadOptions {
                revision: Some("ab".repeat(20)),
            },
        );
        assert!(matches!(
            stream.recv().await.unwrap(),
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn read_stream_respects_the_revision() {
        let temp = tempdir().unwrap();
        let repo = test_repo(&temp);
        let first = repo.add_file("a.txt", b"old bytes").unwrap();
        repo.update_file("a.txt", b"new bytes").unwrap();

        let stream = repo.read_stream(
            "a.txt",
            ReadOptions {
                revision: Some(first.sha1.clone()),
            },
        );
        assert_eq!(stream.read_to_end().await.unwrap(), b"old bytes");
    }
}

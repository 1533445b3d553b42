//! The embedded object database.
//!
//! Blobs, trees, and commits live under `objects/` keyed by their
//! content hash. Trees serialize as NUL-terminated tree records and
//! commits as six NUL-separated fields, so the database's read surface
//! (`ls_tree`, `log`, `diff_raw`) emits exactly the plumbing record
//! formats the store layer decodes with `syncvault_record`.

use crate::error::{StoreError, StoreResult};
use crate::id::{ObjectId, ZERO_ID};
use crate::repodir::sync_directory;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use syncvault_record::{
    parse_tree_records, render_diff_records, render_log_record, render_tree_records, DiffRecord,
    DiffStatus, LogRecord, TreeRecord,
};

/// Number of commit body fields.
const COMMIT_FIELDS: usize = 6;

/// A stored commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommitObj {
    /// Tree the commit points at.
    pub tree: ObjectId,
    /// Commit date in epoch seconds.
    pub date: i64,
    /// Parent commit, absent for the root.
    pub parent: Option<ObjectId>,
    /// Subject line.
    pub subject: String,
    /// Author name.
    pub author_name: String,
    /// Author email.
    pub author_email: String,
}

impl CommitObj {
    fn to_body(&self) -> Vec<u8> {
        format!(
            "{}\0{}\0{}\0{}\0{}\0{}",
            self.tree,
            self.date,
            self.parent.as_ref().map(ObjectId::as_str).unwrap_or(""),
            self.subject,
            self.author_name,
            self.author_email,
        )
        .into_bytes()
    }

    fn from_body(body: &[u8]) -> StoreResult<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|_| StoreError::internal("commit object is not valid UTF-8"))?;
        let fields: Vec<&str> = text.split('\0').collect();
        if fields.len() != COMMIT_FIELDS {
            return Err(StoreError::internal(format!(
                "corrupt commit object: {} fields",
                fields.len()
            )));
        }
        let parent = if fields[2].is_empty() {
            None
        } else {
            Some(ObjectId::parse(fields[2])?)
        };
        Ok(Self {
            tree: ObjectId::parse(fields[0])?,
            date: fields[1]
                .parse()
                .map_err(|_| StoreError::internal("corrupt commit date"))?,
            parent,
            subject: fields[3].to_string(),
            author_name: fields[4].to_string(),
            author_email: fields[5].to_string(),
        })
    }

    /// The plumbing log record for this commit.
    pub(crate) fn to_log_record(&self, id: &ObjectId) -> LogRecord {
        LogRecord {
            tree: self.tree.as_str().to_string(),
            date: self.date,
            parent: self.parent.as_ref().map(|p| p.as_str().to_string()),
            subject: self.subject.clone(),
            commit: id.as_str().to_string(),
            author_name: self.author_name.clone(),
            author_email: self.author_email.clone(),
        }
    }
}

/// Handle to the content-addressed object store of one repository.
#[derive(Debug, Clone)]
pub(crate) struct ObjectDb {
    root: PathBuf,
}

impl ObjectDb {
    /// Opens the object store rooted at `objects/`.
    pub(crate) fn open(root: PathBuf) -> Self {
        Self { root }
    }

    /// Path of an object file: `objects/<first two>/<rest>`.
    pub(crate) fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.as_str();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn put_raw(&self, kind: &str, body: &[u8]) -> StoreResult<ObjectId> {
        let id = ObjectId::hash(kind, body);
        let target = self.object_path(&id);
        if target.exists() {
            // Content-addressed: an existing object is already this object.
            return Ok(id);
        }

        let fan_out = target
            .parent()
            .ok_or_else(|| StoreError::internal("object path has no parent"))?
            .to_path_buf();
        fs::create_dir_all(&fan_out)?;

        let temp = target.with_extension("tmp");
        let mut file = File::create(&temp)?;
        file.write_all(body)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, &target)?;
        sync_directory(&fan_out)?;

        Ok(id)
    }

    /// Reads an object body.
    pub(crate) fn read(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        match fs::read(self.object_path(id)) {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(format!("object {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stores a blob; identical content lands on the same id.
    pub(crate) fn put_blob(&self, content: &[u8]) -> StoreResult<ObjectId> {
        self.put_raw("blob", content)
    }

    /// Stores a tree listing. Records must be sorted ascending by path.
    pub(crate) fn put_tree(&self, records: &[TreeRecord]) -> StoreResult<ObjectId> {
        self.put_raw("tree", &render_tree_records(records))
    }

    /// Stores a commit.
    pub(crate) fn put_commit(&self, commit: &CommitObj) -> StoreResult<ObjectId> {
        self.put_raw("commit", &commit.to_body())
    }

    /// Loads a commit object.
    pub(crate) fn read_commit(&self, id: &ObjectId) -> StoreResult<CommitObj> {
        CommitObj::from_body(&self.read(id)?)
    }

    /// Emits the recursive tree listing of a tree object, as
    /// NUL-terminated tree records.
    pub(crate) fn ls_tree(&self, tree: &ObjectId) -> StoreResult<Vec<u8>> {
        self.read(tree)
    }

    /// Emits the log record line for a single commit.
    pub(crate) fn log_line(&self, id: &ObjectId) -> StoreResult<String> {
        let commit = self.read_commit(id)?;
        Ok(render_log_record(&commit.to_log_record(id)))
    }

    /// Emits newline-separated log records, newest first, walking the
    /// parent chain from `head`.
    pub(crate) fn log(&self, head: &ObjectId, limit: Option<usize>) -> StoreResult<String> {
        let mut lines = Vec::new();
        let mut cursor = Some(head.clone());
        while let Some(id) = cursor {
            if limit.is_some_and(|l| lines.len() >= l) {
                break;
            }
            let commit = self.read_commit(&id)?;
            lines.push(render_log_record(&commit.to_log_record(&id)));
            cursor = commit.parent;
        }
        Ok(lines.join("\n"))
    }

    /// Sizes of the given blobs, resolved in one pass.
    pub(crate) fn batch_sizes(&self, ids: &[ObjectId]) -> StoreResult<HashMap<String, u64>> {
        let mut sizes = HashMap::new();
        let unique: HashSet<&ObjectId> = ids.iter().collect();
        for id in unique {
            let meta = fs::metadata(self.object_path(id)).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StoreError::not_found(format!("object {id}"))
                } else {
                    StoreError::Io(e)
                }
            })?;
            sizes.insert(id.as_str().to_string(), meta.len());
        }
        Ok(sizes)
    }

    /// Emits raw diff records between two trees, sorted by path.
    ///
    /// Exact-content rename detection pairs a deletion and an addition
    /// with the same blob hash; an addition whose content also survives
    /// at an unchanged path becomes a copy record.
    pub(crate) fn diff_raw(&self, from_tree: &ObjectId, to_tree: &ObjectId) -> StoreResult<Vec<u8>> {
        let from = parse_tree_records(&self.ls_tree(from_tree)?)?;
        let to = parse_tree_records(&self.ls_tree(to_tree)?)?;

        let mut changed: Vec<DiffRecord> = Vec::new();
        let mut deleted: Vec<TreeRecord> = Vec::new();
        let mut added: Vec<TreeRecord> = Vec::new();
        // First unchanged path per hash, for copy sources.
        let mut survivors: HashMap<String, TreeRecord> = HashMap::new();

        let (mut i, mut j) = (0usize, 0usize);
        loop {
            match (from.get(i), to.get(j)) {
                (None, None) => break,
                (Some(f), None) => {
                    deleted.push(f.clone());
                    i += 1;
                }
                (None, Some(t)) => {
                    added.push(t.clone());
                    j += 1;
                }
                (Some(f), Some(t)) => {
                    if f.path == t.path {
                        if f.hash != t.hash {
                            changed.push(DiffRecord {
                                old_mode: f.mode,
                                mode: t.mode,
                                old_hash: f.hash.clone(),
                                hash: t.hash.clone(),
                                status: DiffStatus::Modified,
                                old_path: None,
                                path: t.path.clone(),
                            });
                        } else if f.mode != t.mode {
                            changed.push(DiffRecord {
                                old_mode: f.mode,
                                mode: t.mode,
                                old_hash: f.hash.clone(),
                                hash: t.hash.clone(),
                                status: DiffStatus::ModeChanged,
                                old_path: None,
                                path: t.path.clone(),
                            });
                        } else {
                            survivors.entry(t.hash.clone()).or_insert_with(|| t.clone());
                        }
                        i += 1;
                        j += 1;
                    } else if f.path < t.path {
                        deleted.push(f.clone());
                        i += 1;
                    } else {
                        added.push(t.clone());
                        j += 1;
                    }
                }
            }
        }

        let mut records = changed;
        let mut paired = vec![false; added.len()];

        for d in &deleted {
            let rename_target = added
                .iter()
                .enumerate()
                .find(|(k, a)| !paired[*k] && a.hash == d.hash);
            match rename_target {
                Some((k, a)) => {
                    paired[k] = true;
                    records.push(DiffRecord {
                        old_mode: d.mode,
                        mode: a.mode,
                        old_hash: d.hash.clone(),
                        hash: a.hash.clone(),
                        status: DiffStatus::Renamed,
                        old_path: Some(d.path.clone()),
                        path: a.path.clone(),
                    });
                }
                None => records.push(DiffRecord {
                    old_mode: d.mode,
                    mode: 0,
                    old_hash: d.hash.clone(),
                    hash: ZERO_ID.to_string(),
                    status: DiffStatus::Deleted,
                    old_path: None,
                    path: d.path.clone(),
                }),
            }
        }

        for (k, a) in added.iter().enumerate() {
            if paired[k] {
                continue;
            }
            match survivors.get(&a.hash) {
                Some(source) => records.push(DiffRecord {
                    old_mode: source.mode,
                    mode: a.mode,
                    old_hash: source.hash.clone(),
                    hash: a.hash.clone(),
                    status: DiffStatus::Copied,
                    old_path: Some(source.path.clone()),
                    path: a.path.clone(),
                }),
                None => records.push(DiffRecord {
                    old_mode: 0,
                    mode: a.mode,
                    old_hash: ZERO_ID.to_string(),
                    hash: a.hash.clone(),
                    status: DiffStatus::Added,
                    old_path: None,
                    path: a.path.clone(),
                }),
            }
        }

        records.sort_by(|x, y| x.path.cmp(&y.path));
        Ok(render_diff_records(&records))
    }
}

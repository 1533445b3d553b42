//! Repository directory management.
//!
//! On-disk layout of one synchronized volume:
//!
//! ```text
//! <repo_path>/
//! ├─ LOCK            # Advisory lock for single-process access
//! ├─ config.json     # Author identity and format version
//! ├─ HEAD            # Current commit id
//! ├─ index           # Live-checkout index stanzas
//! ├─ objects/        # Content-addressed blobs, trees, commits
//! └─ checkout/       # Live working tree
//! ```
//!
//! HEAD and index updates use the write-then-rename pattern so a crash
//! never leaves a half-written file behind.

use crate::config::RepoConfig;
use crate::error::{StoreError, StoreResult};
use crate::id::ObjectId;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File and directory names within the repository.
const LOCK_FILE: &str = "LOCK";
const CONFIG_FILE: &str = "config.json";
const HEAD_FILE: &str = "HEAD";
const INDEX_FILE: &str = "index";
const OBJECTS_DIR: &str = "objects";
const CHECKOUT_DIR: &str = "checkout";

/// Manages the repository directory structure and file locking.
///
/// A `RepoDir` holds an exclusive advisory lock on the repository; only
/// one instance can exist per directory at a time.
#[derive(Debug)]
pub(crate) struct RepoDir {
    /// Root directory path.
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl RepoDir {
    /// Opens or creates a repository directory.
    pub(crate) fn open(path: &Path, create_if_missing: bool) -> StoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StoreError::not_found(format!(
                    "repository directory: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(StoreError::internal(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        if create_if_missing {
            fs::create_dir_all(path.join(OBJECTS_DIR))?;
            fs::create_dir_all(path.join(CHECKOUT_DIR))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns true if the repository has been initialized with a commit.
    pub(crate) fn is_initialized(&self) -> bool {
        self.path.join(HEAD_FILE).exists()
    }

    /// Returns the objects directory.
    pub(crate) fn objects_root(&self) -> PathBuf {
        self.path.join(OBJECTS_DIR)
    }

    /// Returns the checkout root.
    pub(crate) fn checkout_root(&self) -> PathBuf {
        self.path.join(CHECKOUT_DIR)
    }

    /// Resolves a canonical path inside the checkout.
    pub(crate) fn checkout_path(&self, relative: &str) -> PathBuf {
        self.checkout_root().join(relative)
    }

    /// Returns the path of the HEAD file.
    pub(crate) fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_FILE)
    }

    /// Reads the current HEAD commit id.
    pub(crate) fn head(&self) -> StoreResult<ObjectId> {
        read_head(&self.head_path())
    }

    /// Points HEAD at a commit, atomically.
    pub(crate) fn set_head(&self, id: &ObjectId) -> StoreResult<()> {
        self.write_atomic(HEAD_FILE, format!("{id}\n").as_bytes())
    }

    /// Reads the live-checkout index; empty if never written.
    pub(crate) fn read_index(&self) -> StoreResult<String> {
        match fs::read_to_string(self.path.join(INDEX_FILE)) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the live-checkout index, atomically.
    pub(crate) fn write_index(&self, text: &str) -> StoreResult<()> {
        self.write_atomic(INDEX_FILE, text.as_bytes())
    }

    /// Loads the persisted configuration.
    pub(crate) fn load_config(&self) -> StoreResult<RepoConfig> {
        let data = fs::read(self.path.join(CONFIG_FILE))?;
        serde_json::from_slice(&data)
            .map_err(|e| StoreError::internal(format!("corrupt repository config: {e}")))
    }

    /// Persists the configuration.
    pub(crate) fn save_config(&self, config: &RepoConfig) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(config)
            .map_err(|e| StoreError::internal(format!("encode repository config: {e}")))?;
        self.write_atomic(CONFIG_FILE, &data)
    }

    /// Write-then-rename with a directory fsync.
    fn write_atomic(&self, name: &str, data: &[u8]) -> StoreResult<()> {
        let target = self.path.join(name);
        let temp = self.path.join(format!("{name}.tmp"));

        let mut file = File::create(&temp)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, &target)?;
        sync_directory(&self.path)?;
        Ok(())
    }
}

/// Reads a HEAD file directly. Also used by lazily-resolving readers that
/// only carry paths, not a `RepoDir`.
pub(crate) fn read_head(head_path: &Path) -> StoreResult<ObjectId> {
    match fs::read_to_string(head_path) {
        Ok(text) => ObjectId::parse(text.trim())
            .map_err(|_| StoreError::internal("corrupt HEAD reference")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StoreError::not_found("HEAD reference"))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
pub(crate) fn sync_directory(path: &Path) -> StoreResult<()> {
    // On Unix, fsync on a directory syncs the directory entries.
    let dir = File::open(path)?;
    dir.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn sync_directory(_path: &Path) -> StoreResult<()> {
    // Windows NTFS journaling covers metadata durability.
    Ok(())
}

//! Lazy asynchronous content reads.
//!
//! [`ContentStream`] yields a committed blob's bytes in chunks. The
//! producer resolves path and revision lazily, so a missing path or
//! revision surfaces as an error item on the first receive rather than
//! at call time. Dropping the stream cancels the producer. There is no
//! implicit timeout; callers impose their own.

use crate::error::{StoreError, StoreResult};
use crate::id::ObjectId;
use crate::odb::ObjectDb;
use crate::path::canonicalize_file;
use crate::repodir::read_head;
use crate::repository::HEAD_REV;
use bytes::Bytes;
use std::io::Read;
use std::path::{Path, PathBuf};
use syncvault_record::parse_tree_records;
use tokio::sync::mpsc;

/// Chunk size for streamed reads.
const CHUNK_SIZE: usize = 64 * 1024;

/// Channel depth between producer and consumer.
const CHANNEL_DEPTH: usize = 8;

/// Options for [`Repository::read_stream`](crate::Repository::read_stream).
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Revision to read from; defaults to HEAD.
    pub revision: Option<String>,
}

/// An asynchronous chunked byte stream over one committed blob.
pub struct ContentStream {
    rx: mpsc::Receiver<StoreResult<Bytes>>,
}

impl ContentStream {
    /// Receives the next chunk.
    ///
    /// `Some(Ok(bytes))` is content, `Some(Err(_))` is the stream's
    /// single terminal error, and `None` signals completion.
    pub async fn recv(&mut self) -> Option<StoreResult<Bytes>> {
        self.rx.recv().await
    }

    /// Drains the stream into one buffer.
    pub async fn read_to_end(mut self) -> StoreResult<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(chunk) = self.recv().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

fn resolve_blob_file(
    odb: &ObjectDb,
    head_path: &Path,
    path: &str,
    revision: Option<&str>,
) -> StoreResult<std::fs::File> {
    let canonical = canonicalize_file(path)?;

    let commit_id = match revision {
        None => read_head(head_path)?,
        Some(HEAD_REV) => read_head(head_path)?,
        Some(rev) => {
            let id = ObjectId::parse(rev)
                .map_err(|_| StoreError::not_found(format!("revision {rev}")))?;
            odb.read_commit(&id)
                .map_err(|_| StoreError::not_found(format!("revision {rev}")))?;
            id
        }
    };

    let commit = odb.read_commit(&commit_id)?;
    let records = parse_tree_records(&odb.ls_tree(&commit.tree)?)?;
    let record = records
        .iter()
        .find(|r| r.path == canonical)
        .ok_or_else(|| StoreError::not_found(canonical.clone()))?;
    let blob = ObjectId::parse(&record.hash)?;

    Ok(std::fs::File::open(odb.object_path(&blob))?)
}

/// Spawns the blocking producer for one streamed read.
///
/// Must be called from within a tokio runtime.
pub(crate) fn spawn_read(
    odb: ObjectDb,
    head_path: PathBuf,
    path: String,
    options: ReadOptions,
) -> ContentStream {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        let mut file = match resolve_blob_file(&odb, &head_path, &path, options.revision.as_deref())
        {
            Ok(file) => file,
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                return;
            }
        };

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            match file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    // A closed receiver means the consumer released the
                    // stream; stop producing.
                    if tx.blocking_send(Ok(Bytes::copy_from_slice(&buf[..n]))).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(Err(e.into()));
                    break;
                }
            }
        }
    });

    ContentStream { rx }
}

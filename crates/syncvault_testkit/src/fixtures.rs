//! Test fixtures and repository helpers.
//!
//! Provides convenience functions for setting up on-disk test
//! repositories and servers over them.

use std::sync::Arc;
use syncvault_server::{ServerConfig, SyncServer};
use syncvault_store::{Identity, Repository};
use tempfile::TempDir;

/// A test repository with automatic cleanup.
pub struct TestRepo {
    /// The repository instance.
    pub repo: Arc<Repository>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestRepo {
    /// Creates a fresh repository in a temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let repo = Repository::create(
            &temp_dir.path().join("volume"),
            Identity::new("Test User", "test@example.org"),
        )
        .expect("Failed to create repository");
        Self {
            repo: Arc::new(repo),
            _temp_dir: temp_dir,
        }
    }

    /// Builds a sync server over this repository.
    pub fn server(&self) -> SyncServer {
        SyncServer::new(ServerConfig::default(), Arc::clone(&self.repo))
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestRepo {
    type Target = Repository;

    fn deref(&self) -> &Self::Target {
        &self.repo
    }
}

/// Runs a test with a temporary repository.
///
/// # Example
///
/// ```rust,ignore
/// use syncvault_testkit::fixtures::with_test_repo;
///
/// #[test]
/// fn my_test() {
///     with_test_repo(|repo| {
///         repo.add_file("a.txt", b"content").unwrap();
///     });
/// }
/// ```
pub fn with_test_repo<F, R>(f: F) -> R
where
    F: FnOnce(&Repository) -> R,
{
    let test_repo = TestRepo::new();
    f(&test_repo.repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_repo_is_empty() {
        with_test_repo(|repo| {
            assert!(repo.get_tree("HEAD", None).unwrap().is_empty());
        });
    }

    #[test]
    fn server_fixture_dispatches() {
        let fixture = TestRepo::new();
        let server = fixture.server();
        let (status, _) = server.dispatch("/sync/nope", b"{}");
        assert_eq!(status, 404);
    }
}

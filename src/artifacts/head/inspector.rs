//! Repository inspection
//!
//! The watcher only depends on the [`RepositoryInspector`] contract. The
//! default [`GitInspector`] reads the control directory straight from disk on
//! the blocking pool so the worker task is never stalled by filesystem I/O.

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::head::RepoState;
use std::future::Future;
use std::path::Path;
use tracing::{debug, warn};

/// Answers which repository, if any, owns a directory and what its head is
///
/// Implementations must not block the calling task. Failures are reported as
/// `None`: the watcher has to stay usable outside any repository.
pub trait RepositoryInspector: Send + Sync + 'static {
    fn inspect(&self, directory: &Path) -> impl Future<Output = Option<RepoState>> + Send;
}

/// Inspects git repositories by reading `HEAD` and its references
#[derive(Debug, Clone, Copy, Default)]
pub struct GitInspector;

impl GitInspector {
    /// Synchronous inspection, for callers that are not on the runtime
    pub fn inspect_blocking(directory: &Path) -> anyhow::Result<Option<RepoState>> {
        let Some(repository) = Repository::discover(directory)? else {
            return Ok(None);
        };

        let refs = repository.refs();
        let current_ref = refs.current_ref()?;

        let normalized_head = if current_ref.is_detached_head() {
            refs.read_detached_head()?.map(|oid| oid.to_short_oid())
        } else {
            Some(
                BranchName::try_parse_sym_ref_name(&current_ref)
                    .map(|branch_name| branch_name.to_string())
                    .unwrap_or_else(|_| current_ref.to_string()),
            )
        };

        Ok(Some(RepoState::new(
            repository.git_dir().to_path_buf(),
            normalized_head,
            current_ref.to_string(),
        )))
    }
}

impl RepositoryInspector for GitInspector {
    async fn inspect(&self, directory: &Path) -> Option<RepoState> {
        tokio::task::yield_now().await;

        let owned_directory = directory.to_path_buf();
        let result =
            tokio::task::spawn_blocking(move || Self::inspect_blocking(&owned_directory)).await;

        tokio::task::yield_now().await;

        match result {
            Ok(Ok(state)) => state,
            Ok(Err(err)) => {
                debug!(directory = %directory.display(), error = %err, "repository inspection failed");
                None
            }
            Err(err) => {
                warn!(directory = %directory.display(), error = %err, "repository inspection panicked");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::{FileWriteStr, PathChild};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    const OID: &str = "abc1234def5678abc1234def5678abc1234def56";

    #[fixture]
    fn work_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[rstest]
    #[tokio::test]
    async fn branch_head_is_reported_by_short_name(work_dir: TempDir) {
        work_dir.child(".git/HEAD").write_str("ref: refs/heads/feature/login\n").unwrap();
        work_dir.child(".git/refs/heads/feature/login").write_str(OID).unwrap();

        let state = GitInspector.inspect(work_dir.path()).await.unwrap();

        assert_eq!(state.normalized_head(), Some("feature/login"));
        assert_eq!(state.raw_head_ref(), "refs/heads/feature/login");
        assert!(!state.is_detached());
        assert_eq!(
            state.repo_root_id(),
            work_dir.path().join(".git").canonicalize().unwrap()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn detached_head_is_reported_by_abbreviated_id(work_dir: TempDir) {
        work_dir.child(".git/HEAD").write_str(OID).unwrap();

        let state = GitInspector.inspect(work_dir.path()).await.unwrap();

        assert_eq!(state.normalized_head(), Some("abc1234"));
        assert_eq!(state.raw_head_ref(), "HEAD");
        assert!(state.is_detached());
    }

    #[rstest]
    #[tokio::test]
    async fn detached_head_of_a_sha256_repository_is_still_a_repository(work_dir: TempDir) {
        work_dir
            .child(".git/HEAD")
            .write_str(&format!("{}\n", "fedcba9876543210".repeat(4)))
            .unwrap();

        let state = GitInspector.inspect(work_dir.path()).await.unwrap();

        assert_eq!(state.normalized_head(), Some("fedcba9"));
        assert!(state.is_detached());
    }

    #[rstest]
    #[tokio::test]
    async fn unreadable_head_is_reported_as_absent(work_dir: TempDir) {
        work_dir.child(".git/HEAD").write_str("garbage").unwrap();

        assert!(GitInspector.inspect(work_dir.path()).await.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_directory_is_reported_as_absent(work_dir: TempDir) {
        assert!(GitInspector.inspect(&work_dir.path().join("gone")).await.is_none());
    }
}

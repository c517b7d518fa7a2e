use crate::areas::refs::{HEAD_REF_NAME, Refs};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Name of the control directory (or gitdir link file) inside a work tree
pub const GIT_DIR_NAME: &str = ".git";

const GITDIR_PREFIX: &str = "gitdir:";

/// A repository discovered from some directory inside its work tree
#[derive(Debug, Clone)]
pub struct Repository {
    work_dir: Box<Path>,
    git_dir: Box<Path>,
    refs: Refs,
}

impl Repository {
    /// Find the repository owning `directory`
    ///
    /// Walks from `directory` up to the filesystem root and stops at the first
    /// `.git` entry that leads to a control directory. A `.git` file holding a
    /// `gitdir: <path>` line (linked worktrees, submodules) is followed.
    ///
    /// # Returns
    ///
    /// None when no ancestor belongs to a repository
    pub fn discover(directory: &Path) -> anyhow::Result<Option<Self>> {
        let directory = directory
            .canonicalize()
            .with_context(|| format!("failed to resolve directory {:?}", directory))?;

        for work_dir in directory.ancestors() {
            if let Some(git_dir) = Self::control_dir_at(&work_dir.join(GIT_DIR_NAME))? {
                let git_dir = git_dir
                    .canonicalize()
                    .with_context(|| format!("failed to resolve control directory {:?}", git_dir))?
                    .into_boxed_path();

                return Ok(Some(Repository {
                    work_dir: work_dir.to_path_buf().into_boxed_path(),
                    refs: Refs::new(git_dir.clone()),
                    git_dir,
                }));
            }
        }

        Ok(None)
    }

    fn control_dir_at(candidate: &Path) -> anyhow::Result<Option<PathBuf>> {
        if candidate.is_dir() {
            return Ok(candidate
                .join(HEAD_REF_NAME)
                .is_file()
                .then(|| candidate.to_path_buf()));
        }

        if !candidate.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(candidate)
            .with_context(|| format!("failed to read gitdir file at {:?}", candidate))?;
        let Some(target) = content.trim().strip_prefix(GITDIR_PREFIX) else {
            anyhow::bail!("malformed gitdir file at {:?}", candidate);
        };

        let target = Path::new(target.trim());
        let target = match candidate.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target.to_path_buf(),
        };

        Ok(target.join(HEAD_REF_NAME).is_file().then_some(target))
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }
}

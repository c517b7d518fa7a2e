//! Head state and the notifications derived from it
//!
//! - `inspector`: The boundary that answers "which repository owns this
//!   directory and what is its head"
//!
//! A [`RepoState`] is produced fresh on every inspection and never mutated.
//! The watcher compares successive states and publishes [`WatcherEvent`]s.

pub mod inspector;

use crate::areas::refs::HEAD_REF_NAME;
use colored::Colorize;
use derive_new::new;
use std::path::{Path, PathBuf};

/// Snapshot of a repository's head as seen by one inspection
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct RepoState {
    /// Identifies the repository's metadata store (its control directory)
    repo_root_id: PathBuf,
    /// Branch name or abbreviated commit id, None when nothing can be named
    normalized_head: Option<String>,
    /// Reference HEAD resolves to, `HEAD` itself when detached
    raw_head_ref: String,
}

impl RepoState {
    pub fn repo_root_id(&self) -> &Path {
        &self.repo_root_id
    }

    pub fn normalized_head(&self) -> Option<&str> {
        self.normalized_head.as_deref()
    }

    pub fn raw_head_ref(&self) -> &str {
        &self.raw_head_ref
    }

    pub fn is_detached(&self) -> bool {
        self.raw_head_ref == HEAD_REF_NAME
    }
}

/// Payload of a head change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadChanged {
    pub repo_root_id: PathBuf,
    pub head: Option<String>,
    pub old_head: Option<String>,
    pub detached: bool,
    /// Set on the first notification of a bootstrap; `old_head` is then None
    pub init: bool,
}

impl HeadChanged {
    pub fn initial(state: &RepoState) -> Self {
        Self {
            repo_root_id: state.repo_root_id.clone(),
            head: state.normalized_head.clone(),
            old_head: None,
            detached: state.is_detached(),
            init: true,
        }
    }

    pub fn transition(old_head: Option<String>, state: &RepoState) -> Self {
        Self {
            repo_root_id: state.repo_root_id.clone(),
            head: state.normalized_head.clone(),
            old_head,
            detached: state.is_detached(),
            init: false,
        }
    }
}

/// Everything the watcher publishes to its subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherEvent {
    HeadChanged(HeadChanged),
    /// Coarse "something changed, re-render" signal
    Update,
}

fn colored_head(head: Option<&str>) -> colored::ColoredString {
    match head {
        Some(head) => head.green(),
        None => "<none>".dimmed(),
    }
}

impl std::fmt::Display for HeadChanged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.init {
            write!(f, "{} {}", "init".bold(), colored_head(self.head.as_deref()))?;
        } else {
            write!(
                f,
                "{} {} -> {}",
                "head".bold(),
                colored_head(self.old_head.as_deref()),
                colored_head(self.head.as_deref())
            )?;
        }

        if self.detached {
            write!(f, " {}", "(detached)".yellow())?;
        }

        write!(f, " [{}]", self.repo_root_id.display())
    }
}

impl std::fmt::Display for WatcherEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatcherEvent::HeadChanged(change) => write!(f, "{change}"),
            WatcherEvent::Update => write!(f, "{}", "update".bold()),
        }
    }
}

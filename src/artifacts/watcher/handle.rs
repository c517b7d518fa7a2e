//! Single-path filesystem watch
//!
//! [`WatchHandle`] binds one path to a notification callback. Arming the same
//! path twice is a no-op. A watch whose target was removed or renamed away
//! reports itself inactive, since the underlying inode is gone and the next
//! arm has to register the new file.

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while registering a watch
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to create watcher: {0}")]
    WatcherCreation(#[from] notify::Error),

    #[error("failed to watch path {path:?}: {source}")]
    WatchPath {
        path: PathBuf,
        source: notify::Error,
    },

    #[error("watch target {0:?} does not exist")]
    MissingTarget(PathBuf),
}

/// Simplified kind of a filesystem notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileChangeKind {
    Create,
    Modify,
    Remove,
    Rename,
    Other,
}

impl From<EventKind> for FileChangeKind {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Create(_) => FileChangeKind::Create,
            EventKind::Modify(ModifyKind::Name(_)) => FileChangeKind::Rename,
            EventKind::Modify(_) => FileChangeKind::Modify,
            EventKind::Remove(_) => FileChangeKind::Remove,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => FileChangeKind::Other,
        }
    }
}

impl FileChangeKind {
    /// Whether the watched inode is gone after this notification
    pub fn detaches_watch(self) -> bool {
        matches!(self, FileChangeKind::Remove | FileChangeKind::Rename)
    }
}

/// Descriptor handed to the event callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: FileChangeKind,
}

struct ActiveWatch {
    path: PathBuf,
    detached: Arc<AtomicBool>,
    // dropping the watcher releases the registration
    _watcher: RecommendedWatcher,
}

/// Watch over a single path, restartable on another path
#[derive(Default)]
pub struct WatchHandle {
    active: Option<ActiveWatch>,
    registrations: usize,
}

impl WatchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start delivering notifications for `path` to `on_event`
    ///
    /// Starting on the path that is already actively watched keeps the
    /// existing registration. Any other previous watch is stopped first.
    pub fn start<F>(&mut self, path: &Path, on_event: F) -> Result<(), WatchError>
    where
        F: Fn(FileEvent) + Send + 'static,
    {
        if self.is_active() && self.path() == Some(path) {
            return Ok(());
        }

        self.stop();

        if !path.exists() {
            return Err(WatchError::MissingTarget(path.to_path_buf()));
        }

        let detached = Arc::new(AtomicBool::new(false));
        let detached_flag = detached.clone();
        let watched_path = path.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let kind = FileChangeKind::from(event.kind);

                    #[cfg(feature = "debug_watch")]
                    tracing::trace!(?event, "raw filesystem notification");

                    if kind.detaches_watch() {
                        detached_flag.store(true, Ordering::SeqCst);
                    }

                    let path = event
                        .paths
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| watched_path.clone());
                    on_event(FileEvent { path, kind });
                }
                Err(err) => {
                    warn!(path = %watched_path.display(), error = %err, "filesystem watch error");
                }
            },
            Config::default(),
        )?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::WatchPath {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), "watch registered");
        self.registrations += 1;
        self.active = Some(ActiveWatch {
            path: path.to_path_buf(),
            detached,
            _watcher: watcher,
        });

        Ok(())
    }

    /// Release the current registration, if any
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(path = %active.path.display(), "watch released");
        }
    }

    /// Path of the current registration, active or not
    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }

    /// Whether a registration exists and still points at a live file
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.detached.load(Ordering::SeqCst))
    }

    /// Whether a registration exists, even one whose target went away
    pub fn is_started(&self) -> bool {
        self.active.is_some()
    }

    /// Number of registrations made over the lifetime of this handle
    pub fn registrations(&self) -> usize {
        self.registrations
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("path", &self.path())
            .field("active", &self.is_active())
            .field("registrations", &self.registrations)
            .finish()
    }
}

//! Repository head watcher
//!
//! Tracks which branch (or detached commit) the repository owning a directory
//! has checked out, and notifies subscribers whenever that changes. Changes
//! are picked up from filesystem notifications on the HEAD reflog rather
//! than by polling.
//!
//! ```ignore
//! let watcher = headwatch::spawn(GitInspector, WatcherConfig::from_env()?);
//! let mut events = watcher.subscribe();
//! watcher.on_setup_requested(std::env::current_dir()?);
//!
//! while let Ok(event) = events.recv().await {
//!     // WatcherEvent::HeadChanged(..) / WatcherEvent::Update
//! }
//! ```

pub mod areas;
pub mod artifacts;
pub mod commands;

pub use artifacts::head::inspector::{GitInspector, RepositoryInspector};
pub use artifacts::head::{HeadChanged, RepoState, WatcherEvent};
pub use artifacts::watcher::{HeadWatcherHandle, WatcherConfig, WatcherStatus, spawn};

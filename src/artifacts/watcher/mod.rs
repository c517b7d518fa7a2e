//! Watching a repository's head
//!
//! - `config`: Debounce window, watched file and platform workarounds
//! - `debounce`: Generic trailing-edge debouncer
//! - `handle`: Single-path filesystem watch
//! - `head_watcher`: The state machine tying inspection, watching and
//!   notification together

pub mod config;
pub mod debounce;
pub mod handle;
pub mod head_watcher;

pub use config::WatcherConfig;
pub use head_watcher::{HeadWatcherHandle, WatcherStatus, spawn};

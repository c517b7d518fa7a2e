//! Command implementations behind the `headwatch` binary
//!
//! - `head`: One-shot inspection of the repository owning a directory
//! - `watch`: Runs the head watcher and streams its events

pub mod head;
pub mod watch;

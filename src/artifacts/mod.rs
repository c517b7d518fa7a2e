//! Head watching data structures and algorithms
//!
//! - `branch`: Branch and symbolic reference names
//! - `head`: Head snapshots, notifications and repository inspection
//! - `objects`: Object identifiers of detached heads
//! - `watcher`: Debouncing, filesystem watches and the head watcher itself

pub mod branch;
pub mod head;
pub mod objects;
pub mod watcher;

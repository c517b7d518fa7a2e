//! Git object identifiers
//!
//! A detached HEAD stores a bare object id instead of a symbolic reference.
//! Only the identifier itself matters here: the watcher never reads object
//! contents, it only needs to recognize and abbreviate commit ids.

pub mod object_id;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-256 hash in hexadecimal format
pub const SHA256_OBJECT_ID_LENGTH: usize = 64;

/// Length of the abbreviated form reported for detached heads
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;

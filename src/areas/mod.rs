//! Repository areas
//!
//! - `refs`: Reading HEAD and the references it points to
//! - `repository`: Discovering the repository that owns a directory

pub mod refs;
pub mod repository;

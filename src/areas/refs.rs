//! Git references (HEAD and branches)
//!
//! References are human-readable names pointing to commits. They can be:
//! - Direct: Containing a commit id (SHA-1, or SHA-256 in newer repositories)
//! - Symbolic: Pointing to another reference (e.g., HEAD -> refs/heads/master)
//!
//! ## File Format
//!
//! References are stored as text files containing either:
//! - A 40 or 64 character hex object id (direct reference)
//! - `ref: <path>` for symbolic references
//!
//! Only reading is supported: the watcher observes HEAD, it never moves it.

use crate::artifacts::branch::branch_name::SymRefName;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Read-only view over the references of one control directory
#[derive(Debug, Clone, new)]
pub struct Refs {
    /// Path to the control directory (typically `.git`)
    path: Box<Path>,
}

/// Matches a symbolic reference line, capturing the target name
static SYMREF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ref: (.+)$").expect("symref regex should compile"));

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Symbolic references nested deeper than this are treated as a cycle
const MAX_SYMREF_DEPTH: usize = 5;

/// Internal representation of a reference value
#[derive(Debug, Clone)]
enum SymRefOrOid {
    /// Symbolic reference pointing to another ref
    SymRef { sym_ref_name: SymRefName },
    /// Direct object ID
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        if let Some(symref_match) = SYMREF_REGEX.captures(content) {
            Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].trim().to_string()),
            }))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    /// Get the reference HEAD finally resolves to
    ///
    /// Follows symbolic references until reaching a reference holding an
    /// object id or a reference that does not exist yet (an unborn branch).
    /// For example, if HEAD points to refs/heads/main, returns refs/heads/main.
    /// A detached HEAD resolves to `HEAD` itself.
    pub fn current_ref(&self) -> anyhow::Result<SymRefName> {
        self.follow_symref(SymRefName::head(), 0)
    }

    fn follow_symref(&self, source: SymRefName, depth: usize) -> anyhow::Result<SymRefName> {
        if depth > MAX_SYMREF_DEPTH {
            anyhow::bail!("symbolic reference chain starting at HEAD is too deep");
        }

        let ref_content =
            SymRefOrOid::read_symref_or_oid(self.path.join(source.as_ref_path()).as_path())?;

        match ref_content {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                self.follow_symref(sym_ref_name, depth + 1)
            }
            Some(SymRefOrOid::Oid(_)) | None => Ok(source),
        }
    }

    /// Read the object id stored directly in HEAD
    ///
    /// # Returns
    ///
    /// Some(ObjectId) when HEAD is detached, None when it is symbolic or empty
    pub fn read_detached_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read_symref_or_oid(&self.head_path())? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef { .. }) | None => Ok(None),
        }
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }
}

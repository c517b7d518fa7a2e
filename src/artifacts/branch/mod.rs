//! Branch and symbolic reference names
//!
//! HEAD either names a reference (`refs/heads/main`) or is detached. The
//! helpers here turn the reference HEAD resolves to into the short branch
//! name reported to subscribers.

pub mod branch_name;

use regex::Regex;
use std::sync::LazyLock;

/// Matches anything git refuses in a branch name
pub static INVALID_BRANCH_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]")
        .expect("branch name regex should compile")
});

/// Prefix shared by every local branch reference
pub const REF_PREFIX: &str = "refs/heads/";

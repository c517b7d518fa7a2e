use assert_fs::TempDir;
use assert_fs::prelude::{FileWriteStr, PathChild, PathCreateDir};
use fake::Fake;
use fake::faker::lorem::en::Word;
use rstest::fixture;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FIRST_OID: &str = "abc1234def5678abc1234def5678abc1234def56";
pub const SECOND_OID: &str = "0123456789abcdef0123456789abcdef01234567";
const ZERO_OID: &str = "0000000000000000000000000000000000000000";

/// A work tree with a hand-written `.git` control directory
///
/// Writes follow the order git uses: HEAD and refs first, then the reflog
/// entry, so the reflog notification always sees the final HEAD.
#[derive(Debug)]
pub struct RepositoryFixture {
    dir: TempDir,
}

impl RepositoryFixture {
    /// Control directory with HEAD on `branch` and no commits
    pub fn unborn(branch: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        dir.child(".git/objects").create_dir_all().unwrap();
        dir.child(".git/refs/heads").create_dir_all().unwrap();
        dir.child(".git/HEAD")
            .write_str(&format!("ref: refs/heads/{branch}\n"))
            .unwrap();

        RepositoryFixture { dir }
    }

    pub fn work_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn git_dir(&self) -> PathBuf {
        self.dir
            .path()
            .join(".git")
            .canonicalize()
            .expect("Failed to resolve control directory")
    }

    pub fn head_log(&self) -> PathBuf {
        self.dir.path().join(".git").join("logs").join("HEAD")
    }

    pub fn child_dir(&self, name: &str) -> PathBuf {
        let child = self.dir.child(name);
        child.create_dir_all().unwrap();
        child.path().to_path_buf()
    }

    /// Record a commit on the current branch
    pub fn commit(&self, branch: &str, oid: &str) {
        self.dir
            .child(format!(".git/refs/heads/{branch}"))
            .write_str(&format!("{oid}\n"))
            .unwrap();
        self.append_reflog(oid, "commit: work");
    }

    pub fn checkout_branch(&self, branch: &str, oid: &str) {
        self.dir
            .child(format!(".git/refs/heads/{branch}"))
            .write_str(&format!("{oid}\n"))
            .unwrap();
        self.dir
            .child(".git/HEAD")
            .write_str(&format!("ref: refs/heads/{branch}\n"))
            .unwrap();
        self.append_reflog(oid, &format!("checkout: moving to {branch}"));
    }

    pub fn checkout_detached(&self, oid: &str) {
        self.dir
            .child(".git/HEAD")
            .write_str(&format!("{oid}\n"))
            .unwrap();
        self.append_reflog(oid, &format!("checkout: moving to {oid}"));
    }

    /// Touch the reflog without moving HEAD
    pub fn append_reflog(&self, oid: &str, message: &str) {
        let log_path = self.head_log();
        std::fs::create_dir_all(log_path.parent().unwrap()).unwrap();

        let mut log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .expect("Failed to open HEAD reflog");
        writeln!(
            log,
            "{ZERO_OID} {oid} fake_user <fake_email@email.com> 1672574400 +0000\t{message}"
        )
        .expect("Failed to append to HEAD reflog");
    }

    pub fn remove_control_dir(&self) {
        std::fs::remove_dir_all(self.dir.path().join(".git")).unwrap();
    }
}

/// Repository on `main` with one commit
#[fixture]
pub fn repository() -> RepositoryFixture {
    let repository = RepositoryFixture::unborn("main");
    repository.commit("main", FIRST_OID);
    repository
}

/// Repository on `main` without any commit, hence without a reflog
#[fixture]
pub fn empty_repository() -> RepositoryFixture {
    RepositoryFixture::unborn("main")
}

/// Random valid branch name
#[fixture]
pub fn branch_name() -> String {
    format!("feature/{}", Word().fake::<String>().to_lowercase())
}

/// Directory that is not part of any repository
#[fixture]
pub fn plain_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

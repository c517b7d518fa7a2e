use assert_cmd::Command;
use std::path::Path;
use std::process::{Child, Stdio};

pub fn run_headwatch_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("headwatch").expect("Failed to find headwatch binary");
    cmd.envs(vec![("RUST_LOG", "off")]);
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Start headwatch in the background with piped stdin and stdout
pub fn spawn_headwatch_process(dir: &Path, args: &[&str]) -> Child {
    std::process::Command::new(assert_cmd::cargo::cargo_bin("headwatch"))
        .env("RUST_LOG", "off")
        .current_dir(dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start headwatch")
}

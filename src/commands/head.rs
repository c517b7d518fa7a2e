use crate::artifacts::head::inspector::GitInspector;
use colored::Colorize;
use std::io::Write;
use std::path::Path;

pub fn head(directory: &Path, writer: &mut dyn Write) -> anyhow::Result<()> {
    let state = GitInspector::inspect_blocking(directory)?
        .ok_or_else(|| anyhow::anyhow!("not inside a repository: {}", directory.display()))?;

    match state.normalized_head() {
        Some(head) if state.is_detached() => {
            writeln!(writer, "{} {}", head, "(detached)".yellow())?
        }
        Some(head) => writeln!(writer, "{}", head)?,
        None => writeln!(writer, "{}", "(no head)".dimmed())?,
    }

    Ok(())
}

use crate::artifacts::head::WatcherEvent;
use crate::artifacts::head::inspector::GitInspector;
use crate::artifacts::watcher::{WatcherConfig, spawn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{info, warn};

/// Extra time given to a pending directory change before exiting on end of input
const DRAIN_GRACE: Duration = Duration::from_millis(50);

/// Options of the `watch` command
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub directory: PathBuf,
    pub config: WatcherConfig,
    /// Treat every stdin line as a directory change and exit at end of input
    pub follow_stdin: bool,
}

/// Stream head events for `options.directory` until interrupted
pub async fn watch(options: WatchOptions, writer: &mut dyn Write) -> anyhow::Result<()> {
    let debounce = options.config.debounce;
    let watcher = spawn(GitInspector, options.config);
    let mut events = watcher.subscribe();

    info!(directory = %options.directory.display(), "watching repository head");
    watcher.on_setup_requested(options.directory);

    let mut lines = if options.follow_stdin {
        Some(forward_stdin_lines()?)
    } else {
        None
    };
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;

            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(event) => write_event(writer, &event)?,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output fell behind"),
                Err(RecvError::Closed) => break,
            },
            line = next_line(&mut lines) => match line.transpose()? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => watcher.on_directory_changed(PathBuf::from(line.trim())),
                None => {
                    // let the last directory change reach the worker before shutting down
                    tokio::time::sleep(debounce + DRAIN_GRACE).await;
                    break;
                }
            },
        }
    }

    watcher.shutdown().await;
    drain(&mut events, writer)
}

type StdinLines = mpsc::UnboundedReceiver<std::io::Result<String>>;

/// Read stdin on a plain thread, off the runtime's blocking pool
///
/// A blocked stdin read cannot be cancelled and would hold up runtime shutdown.
fn forward_stdin_lines() -> anyhow::Result<StdinLines> {
    let (lines_tx, lines_rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("headwatch-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if lines_tx.send(line).is_err() {
                    return;
                }
            }
        })?;

    Ok(lines_rx)
}

/// Next stdin line, or never when stdin is not followed
async fn next_line(lines: &mut Option<StdinLines>) -> Option<std::io::Result<String>> {
    match lines {
        Some(lines) => lines.recv().await,
        None => std::future::pending().await,
    }
}

fn drain(
    events: &mut broadcast::Receiver<WatcherEvent>,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) => write_event(writer, &event)?,
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "event output fell behind"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

fn write_event(writer: &mut dyn Write, event: &WatcherEvent) -> anyhow::Result<()> {
    writeln!(writer, "{event}")?;
    writer.flush()?;
    Ok(())
}

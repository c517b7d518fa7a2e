use anyhow::Result;
use clap::{Parser, Subcommand};
use headwatch::WatcherConfig;
use headwatch::commands::head::head;
use headwatch::commands::watch::{WatchOptions, watch};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "headwatch=info";

#[derive(Parser)]
#[command(
    name = "headwatch",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Watch the checked-out branch of a repository",
    long_about = "Reports which branch (or detached commit) the repository owning a directory \
    has checked out, and streams a notification every time it changes. \
    Changes are picked up from filesystem notifications, not by polling.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "head",
        about = "Print the current head of a repository",
        long_about = "This command prints the branch name, or the abbreviated commit id when HEAD \
        is detached, of the repository owning the given directory."
    )]
    Head {
        #[arg(index = 1, help = "A directory inside the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "watch",
        about = "Stream head changes of a repository",
        long_about = "This command prints one line per event: the initial head, every head change \
        and a coarse update signal. With --stdin, every line read is treated as a change of \
        the working directory and the command exits at end of input."
    )]
    Watch {
        #[arg(index = 1, help = "The directory to start watching from")]
        path: Option<PathBuf>,
        #[arg(long, help = "Debounce window in milliseconds")]
        debounce_ms: Option<u64>,
        #[arg(long, help = "Read directory changes from stdin, one per line")]
        stdin: bool,
    },
}

fn init_tracing() -> Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::try_from_default_env()?,
        Err(_) => EnvFilter::try_new(DEFAULT_LOG_FILTER)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    Ok(())
}

fn directory_or_cwd(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Head { path } => {
            let directory = directory_or_cwd(path)?;
            head(&directory, &mut std::io::stdout())?
        }
        Commands::Watch {
            path,
            debounce_ms,
            stdin,
        } => {
            let mut config = WatcherConfig::from_env()?;
            if let Some(debounce_ms) = debounce_ms {
                config = config.with_debounce(Duration::from_millis(debounce_ms));
            }

            let options = WatchOptions {
                directory: directory_or_cwd(path)?,
                config,
                follow_stdin: stdin,
            };
            watch(options, &mut std::io::stdout()).await?
        }
    }

    Ok(())
}

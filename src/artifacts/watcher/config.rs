use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the debounce window, in milliseconds
pub const DEBOUNCE_MS_ENV: &str = "HEADWATCH_DEBOUNCE_MS";
/// Overrides the head-reference file, relative to the control directory
pub const HEAD_REF_FILE_ENV: &str = "HEADWATCH_HEAD_REF_FILE";
/// Forces (`1`/`true`) or disables (`0`/`false`) the yield between stop and restart
pub const RESTART_YIELD_ENV: &str = "HEADWATCH_RESTART_YIELD";

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
/// The HEAD reflog: appended on every checkout and commit, absent before the first commit
const DEFAULT_HEAD_REF_FILE: &str = "logs/HEAD";

/// Tunables of the head watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Trailing window applied to directory changes and file notifications
    pub debounce: Duration,
    /// File watched for head changes, relative to the repository control directory
    pub head_ref_file: PathBuf,
    /// Yield to the runtime between stopping and restarting a watch
    pub restart_yield: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        WatcherConfig {
            debounce: DEFAULT_DEBOUNCE,
            head_ref_file: PathBuf::from(DEFAULT_HEAD_REF_FILE),
            // restarting a watch in the same turn can stall these backends
            restart_yield: cfg!(any(target_os = "macos", target_os = "windows")),
        }
    }
}

impl WatcherConfig {
    /// Defaults overridden by the `HEADWATCH_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = WatcherConfig::default();

        if let Some(debounce_ms) = lookup(DEBOUNCE_MS_ENV) {
            let debounce_ms = debounce_ms
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{DEBOUNCE_MS_ENV} must be a number of milliseconds"))?;
            config.debounce = Duration::from_millis(debounce_ms);
        }

        if let Some(head_ref_file) = lookup(HEAD_REF_FILE_ENV) {
            let head_ref_file = PathBuf::from(head_ref_file.trim());
            if head_ref_file.as_os_str().is_empty() || head_ref_file.is_absolute() {
                anyhow::bail!("{HEAD_REF_FILE_ENV} must be a path relative to the control directory");
            }
            config.head_ref_file = head_ref_file;
        }

        if let Some(restart_yield) = lookup(RESTART_YIELD_ENV) {
            config.restart_yield = match restart_yield.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => anyhow::bail!("{RESTART_YIELD_ENV} must be a boolean, got '{other}'"),
            };
        }

        Ok(config)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

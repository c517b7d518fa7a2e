//! Head change state machine
//!
//! All state transitions run on a single worker task that drains a command
//! queue, so a check always completes (re-arm included) before the next queued
//! trigger is looked at. Filesystem callbacks and host triggers only enqueue.
//!
//! ```text
//! on_directory_changed ──debounce──┐
//! on_setup_requested ──────────────┤
//!                                  ▼
//!                         [worker: Bootstrap] ──► inspect ──► arm WatchHandle
//!                                                                  │
//! WatchHandle event ──debounce──► [worker: FileChanged] ◄──────────┘
//!                                          │
//!                                          ▼
//!                          inspect ──► diff ──► HeadChanged / Update ──► re-arm
//! ```

use crate::artifacts::head::inspector::RepositoryInspector;
use crate::artifacts::head::{HeadChanged, RepoState, WatcherEvent};
use crate::artifacts::watcher::config::WatcherConfig;
use crate::artifacts::watcher::debounce::Debouncer;
use crate::artifacts::watcher::handle::{FileEvent, WatchHandle};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

/// Capacity of the notification bus; slow subscribers observe `Lagged`
const EVENT_BUFFER: usize = 64;

/// Observable phase of the watcher
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WatcherStatus {
    /// No directory known, or the directory is not inside a repository
    #[default]
    Idle,
    /// A head is known; `watched_path` is None when nothing could be watched
    Armed { watched_path: Option<PathBuf> },
    /// A check is in flight
    Transitioning,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    status: WatcherStatus,
    state: Option<RepoState>,
}

enum Command {
    Bootstrap(PathBuf),
    FileChanged(FileEvent),
    Shutdown(oneshot::Sender<()>),
}

/// The live binding between the head-reference file and the directory it was armed for
#[derive(Debug)]
struct WatcherSession {
    handle: WatchHandle,
    owner_directory: PathBuf,
}

impl WatcherSession {
    fn watched_path(&self) -> Option<&Path> {
        self.handle.path()
    }
}

/// Worker-side state; only ever touched from the worker task
pub(crate) struct HeadWatcher<I> {
    inspector: I,
    config: WatcherConfig,
    session: Option<WatcherSession>,
    last_known_head: Option<String>,
    armed: bool,
    file_debouncer: Debouncer<FileEvent>,
    events: broadcast::Sender<WatcherEvent>,
    snapshot: watch::Sender<Snapshot>,
}

impl<I: RepositoryInspector> HeadWatcher<I> {
    fn new(
        inspector: I,
        config: WatcherConfig,
        commands: mpsc::WeakUnboundedSender<Command>,
        events: broadcast::Sender<WatcherEvent>,
        snapshot: watch::Sender<Snapshot>,
    ) -> Self {
        // weak so that an armed watch never keeps the worker alive on its own
        let file_debouncer = Debouncer::new(config.debounce, move |event| {
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::FileChanged(event));
            }
        });

        HeadWatcher {
            inspector,
            config,
            session: None,
            last_known_head: None,
            armed: false,
            file_debouncer,
            events,
            snapshot,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Bootstrap(directory) => self.bootstrap(&directory).await,
                Command::FileChanged(event) => self.recheck(event).await,
                Command::Shutdown(done) => {
                    self.stop_session();
                    let _ = done.send(());
                    return;
                }
            }
        }

        self.stop_session();
    }

    /// Inspect `directory` from scratch and arm on its head-reference file
    async fn bootstrap(&mut self, directory: &Path) {
        self.set_status(WatcherStatus::Transitioning);

        let Some(state) = self.inspector.inspect(directory).await else {
            debug!(directory = %directory.display(), "no repository found");
            self.go_idle();
            return;
        };

        info!(
            directory = %directory.display(),
            head = state.normalized_head().unwrap_or("<none>"),
            detached = state.is_detached(),
            "repository head observed"
        );

        let initial = HeadChanged::initial(&state);
        let head_ref_path = self.head_ref_path(&state);
        self.last_known_head = state.normalized_head().map(str::to_owned);
        self.armed = true;
        self.snapshot.send_modify(|snapshot| snapshot.state = Some(state));

        self.publish(WatcherEvent::HeadChanged(initial));
        self.publish(WatcherEvent::Update);

        if head_ref_path.exists() {
            self.arm(head_ref_path, directory.to_path_buf()).await;
        } else {
            debug!(path = %head_ref_path.display(), "head reference file missing, not armed");
            self.stop_session();
        }

        self.refresh_status();
    }

    /// Re-inspect after the watched file fired and report a real head change
    async fn recheck(&mut self, event: FileEvent) {
        tokio::task::yield_now().await;

        let Some(owner_directory) = self
            .session
            .as_ref()
            .map(|session| session.owner_directory.clone())
        else {
            trace!(path = %event.path.display(), "notification for a released watch ignored");
            return;
        };

        trace!(path = %event.path.display(), kind = ?event.kind, "head reference file changed");
        self.set_status(WatcherStatus::Transitioning);

        let Some(state) = self.inspector.inspect(&owner_directory).await else {
            warn!(
                directory = %owner_directory.display(),
                "repository could not be inspected, keeping the current watch"
            );
            self.refresh_status();
            return;
        };

        let change = (state.normalized_head() != self.last_known_head.as_deref())
            .then(|| HeadChanged::transition(self.last_known_head.take(), &state));
        self.last_known_head = state.normalized_head().map(str::to_owned);
        self.snapshot.send_modify(|snapshot| snapshot.state = Some(state));

        if let Some(change) = change {
            info!(
                old_head = change.old_head.as_deref().unwrap_or("<none>"),
                head = change.head.as_deref().unwrap_or("<none>"),
                detached = change.detached,
                "head changed"
            );

            self.publish(WatcherEvent::HeadChanged(change));
            self.publish(WatcherEvent::Update);
        }

        self.rearm().await;
        self.refresh_status();
    }

    async fn rearm(&mut self) {
        let Some((watched_path, owner_directory)) = self.session.as_ref().and_then(|session| {
            session
                .watched_path()
                .map(|path| (path.to_path_buf(), session.owner_directory.clone()))
        }) else {
            return;
        };

        if watched_path.exists() {
            self.arm(watched_path, owner_directory).await;
        } else {
            info!(path = %watched_path.display(), "watched file disappeared, watch released");
            self.stop_session();
        }
    }

    /// Point the single session at `path`, reusing it when already armed there
    async fn arm(&mut self, path: PathBuf, owner_directory: PathBuf) {
        let mut handle = match self.session.take() {
            Some(mut session) => {
                if session.handle.is_active() && session.watched_path() == Some(path.as_path()) {
                    session.owner_directory = owner_directory;
                    self.session = Some(session);
                    return;
                }

                if session.handle.is_started() {
                    session.handle.stop();
                    if self.config.restart_yield {
                        tokio::task::yield_now().await;
                    }
                }

                session.handle
            }
            None => WatchHandle::new(),
        };

        let debouncer = self.file_debouncer.clone();
        match handle.start(&path, move |event| debouncer.trigger(event)) {
            Ok(()) => {
                debug!(path = %path.display(), directory = %owner_directory.display(), "watch armed");
                self.session = Some(WatcherSession {
                    handle,
                    owner_directory,
                });
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to arm watch");
            }
        }
    }

    fn go_idle(&mut self) {
        self.stop_session();
        self.armed = false;
        self.snapshot.send_modify(|snapshot| {
            snapshot.state = None;
            snapshot.status = WatcherStatus::Idle;
        });

        if self.last_known_head.take().is_some() {
            self.publish(WatcherEvent::Update);
        }
    }

    fn stop_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.handle.stop();
        }
    }

    fn head_ref_path(&self, state: &RepoState) -> PathBuf {
        state.repo_root_id().join(&self.config.head_ref_file)
    }

    fn publish(&self, event: WatcherEvent) {
        // no subscribers is not an error
        let _ = self.events.send(event);
    }

    fn set_status(&self, status: WatcherStatus) {
        self.snapshot.send_modify(|snapshot| snapshot.status = status);
    }

    fn refresh_status(&self) {
        let status = if self.armed {
            WatcherStatus::Armed {
                watched_path: self
                    .session
                    .as_ref()
                    .and_then(|session| session.watched_path().map(Path::to_path_buf)),
            }
        } else {
            WatcherStatus::Idle
        };

        self.set_status(status);
    }
}

/// Host-facing side of a running head watcher
///
/// Dropping every handle stops the worker and releases the watch; prefer
/// [`HeadWatcherHandle::shutdown`] to wait for that to happen.
pub struct HeadWatcherHandle {
    commands: mpsc::UnboundedSender<Command>,
    directory_debouncer: Debouncer<PathBuf>,
    events: broadcast::Sender<WatcherEvent>,
    snapshot: watch::Receiver<Snapshot>,
}

/// Start a head watcher on the current runtime
///
/// Nothing is inspected until the host calls
/// [`HeadWatcherHandle::on_setup_requested`] or
/// [`HeadWatcherHandle::on_directory_changed`].
pub fn spawn<I: RepositoryInspector>(inspector: I, config: WatcherConfig) -> HeadWatcherHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());

    let directory_debouncer = {
        let commands = commands_tx.clone();
        Debouncer::new(config.debounce, move |directory| {
            let _ = commands.send(Command::Bootstrap(directory));
        })
    };

    let watcher = HeadWatcher::new(
        inspector,
        config,
        commands_tx.downgrade(),
        events_tx.clone(),
        snapshot_tx,
    );
    tokio::spawn(watcher.run(commands_rx));

    HeadWatcherHandle {
        commands: commands_tx,
        directory_debouncer,
        events: events_tx,
        snapshot: snapshot_rx,
    }
}

impl HeadWatcherHandle {
    /// The working directory changed; re-evaluated once the burst settles
    pub fn on_directory_changed(&self, directory: impl Into<PathBuf>) {
        self.directory_debouncer.trigger(directory.into());
    }

    /// Evaluate `directory` right away, without waiting for a directory change
    pub fn on_setup_requested(&self, directory: impl Into<PathBuf>) {
        if self
            .commands
            .send(Command::Bootstrap(directory.into()))
            .is_err()
        {
            warn!("head watcher is no longer running");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WatcherEvent> {
        self.events.subscribe()
    }

    /// Last state the watcher observed, None while idle
    pub fn current_state(&self) -> Option<RepoState> {
        self.snapshot.borrow().state.clone()
    }

    pub fn current_head(&self) -> Option<String> {
        self.snapshot
            .borrow()
            .state
            .as_ref()
            .and_then(|state| state.normalized_head().map(str::to_owned))
    }

    pub fn status(&self) -> WatcherStatus {
        self.snapshot.borrow().status.clone()
    }

    /// Stop the worker after the commands already queued, releasing the watch
    pub async fn shutdown(self) {
        let (done_tx, done_rx) = oneshot::channel();

        if self.commands.send(Command::Shutdown(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

impl std::fmt::Debug for HeadWatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadWatcherHandle")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

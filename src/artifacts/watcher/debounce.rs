//! Trailing-edge debouncing
//!
//! A [`Debouncer`] collapses a burst of triggers into one execution that runs
//! `window` after the last trigger of the burst, with that trigger's value.
//! Triggering may happen from any thread, including filesystem callback
//! threads that are not part of the runtime.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Cloneable handle to one debounced callback
///
/// Clones share the pending execution, so triggering through any clone
/// supersedes a trigger made through another.
pub struct Debouncer<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    window: Duration,
    callback: Callback<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
    runtime: Handle,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Wrap `callback` so it runs once per burst of triggers
    ///
    /// # Panics
    ///
    /// When called outside a Tokio runtime
    pub fn new<F>(window: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self::with_runtime(window, callback, Handle::current())
    }

    pub fn with_runtime<F>(window: Duration, callback: F, runtime: Handle) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Debouncer {
            inner: Arc::new(Inner {
                window,
                callback: Arc::new(callback),
                pending: Mutex::new(None),
                runtime,
            }),
        }
    }

    /// Schedule the callback `window` from now, replacing any pending run
    pub fn trigger(&self, value: T) {
        let window = self.inner.window;
        let callback = self.inner.callback.clone();

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(superseded) = pending.take() {
            superseded.abort();
        }

        *pending = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            callback(value);
        }));
    }

    /// Whether a trigger is still waiting for its window to elapse
    pub fn is_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Debouncer {
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.inner.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    const WINDOW: Duration = Duration::from_millis(100);

    fn recording_debouncer() -> (Debouncer<u32>, Arc<Mutex<Vec<(u32, Instant)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        let debouncer = Debouncer::new(WINDOW, move |value| {
            recorded.lock().unwrap().push((value, Instant::now()));
        });

        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_triggers_runs_once_after_the_last_one() {
        let (debouncer, calls) = recording_debouncer();
        let start = Instant::now();

        for value in 0..5 {
            debouncer.trigger(value);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let last_trigger = start + Duration::from_millis(40);

        tokio::time::sleep(Duration::from_millis(500)).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 4);
        let elapsed = calls[0].1 - last_trigger;
        assert!(elapsed >= WINDOW && elapsed < WINDOW + Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_runs_before_the_window_elapses() {
        let (debouncer, calls) = recording_debouncer();

        debouncer.trigger(1);
        tokio::time::sleep(Duration::from_millis(90)).await;
        debouncer.trigger(2);
        tokio::time::sleep(Duration::from_millis(90)).await;

        assert!(calls.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            calls.lock().unwrap().iter().map(|(value, _)| *value).collect::<Vec<_>>(),
            vec![2]
        );
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_run_separately() {
        let (debouncer, calls) = recording_debouncer();

        debouncer.trigger(1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.clone().trigger(2);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(
            calls.lock().unwrap().iter().map(|(value, _)| *value).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn triggers_from_outside_the_runtime_are_accepted() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let debouncer = Debouncer::with_runtime(
            Duration::from_millis(10),
            move |value: u32| {
                let _ = tx.send(value);
            },
            runtime.handle().clone(),
        );

        std::thread::spawn(move || debouncer.trigger(7))
            .join()
            .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }
}

//! Coalescing of rapid input into a single value.
//!
//! [`Debouncer`] is clock-agnostic: callers pass the current [`Instant`],
//! which keeps it usable from synchronous event handlers and trivially
//! testable. [`DebouncedInput`] wraps the same policy in a tokio task for
//! callers that want the quiet window to elapse on its own.

use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Quiet window of the student search box
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// At most one pending value; every push replaces it and restarts the window
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending value and restart the quiet window at `now`.
    ///
    /// A pending value whose window already elapsed before `now` would have
    /// fired on a real timer, so it is returned instead of being replaced.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        let due = self.poll(now);
        self.pending = Some((value, now + self.window));
        due
    }

    /// Take the pending value if its quiet window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without emitting it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}

/// Debounced channel backed by a tokio task.
///
/// Values fed through [`input`](Self::input) come out of
/// [`next`](Self::next) once no newer value arrived for the quiet window.
/// The task is aborted on [`dispose`](Self::dispose) or drop, discarding
/// anything still pending.
#[derive(Debug)]
pub struct DebouncedInput<T> {
    tx: mpsc::UnboundedSender<Pending<T>>,
    rx: mpsc::UnboundedReceiver<T>,
    task: JoinHandle<()>,
}

#[derive(Debug)]
enum Pending<T> {
    Value(T),
    Cancel,
}

impl<T: Send + 'static> DebouncedInput<T> {
    /// Spawn the timer task. Must be called inside a tokio runtime.
    pub fn spawn(window: Duration) -> Self {
        let (tx, mut in_rx) = mpsc::unbounded_channel::<Pending<T>>();
        let (out_tx, rx) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                let Some(value) = pending.take() else {
                    match in_rx.recv().await {
                        Some(Pending::Value(first)) => {
                            pending = Some(first);
                            continue;
                        }
                        Some(Pending::Cancel) => continue,
                        None => break,
                    }
                };

                tokio::select! {
                    next = in_rx.recv() => match next {
                        Some(Pending::Value(newer)) => {
                            trace!("Debounce window restarted");
                            pending = Some(newer);
                        }
                        Some(Pending::Cancel) => trace!("Pending value cancelled"),
                        None => break,
                    },
                    _ = tokio::time::sleep(window) => {
                        if out_tx.send(value).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { tx, rx, task }
    }

    /// Feed a new value, restarting the quiet window. Ignored after dispose.
    pub fn input(&self, value: T) {
        let _ = self.tx.send(Pending::Value(value));
    }

    /// Drop the pending value, if any, keeping the task alive
    pub fn cancel(&self) {
        let _ = self.tx.send(Pending::Cancel);
    }

    /// Wait for the next settled value. `None` once disposed.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Cancel the timer task and anything pending
    pub fn dispose(&mut self) {
        self.task.abort();
    }

    pub fn is_disposed(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Drop for DebouncedInput<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

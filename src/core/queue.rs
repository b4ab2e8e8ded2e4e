//! # SerialQueue: strictly ordered, non-overlapping execution.
//!
//! Every submitted work item runs on the queue's single consumer loop, one at a
//! time, in the order its enqueue step completed.
//!
//! ## Architecture
//! ```text
//! callers (many)                        consumer loop (one)
//!   submit() ─────────┐
//!   submit_and_await()┼──► [intake: mpsc unbounded] ──► TaskRunner ──► work(ctx)
//!   await_idle()  ────┘      (guarded by one lock)          │
//!                                                           └─► result sink
//!   request_shutdown(cb) ──► close intake ──► drain ──► Stopped ──► cb()
//! ```
//!
//! ## Rules
//! - **Mutual exclusion**: no two items of one queue ever run concurrently.
//! - **FIFO**: order of completed enqueue steps; per-thread program order is preserved.
//! - **Fire-and-forget**: [`SerialQueue::submit`] on a stopping/stopped queue is a silent no-op.
//! - **Isolation**: an item's error or panic reaches only its own awaiting caller.
//! - **Graceful shutdown**: already accepted items still run; shutdown callbacks fire once
//!   `Stopped` is reached, exactly once each.
//!
//! ## Example
//! ```rust
//! use taskserial::{QueueState, SerialQueue};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), taskserial::QueueError> {
//!     let queue = SerialQueue::new();
//!
//!     queue.submit(|_ctx: CancellationToken| async { println!("first") });
//!     let n = queue.submit_and_await(|_ctx| async { 40 + 2 }).await?;
//!     assert_eq!(n, 42);
//!
//!     queue.shutdown_and_await().await;
//!     assert_eq!(queue.state(), QueueState::Stopped);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::QueueConfig;
use crate::core::builder::QueueBuilder;
use crate::core::job::fuse;
use crate::core::shared::Shared;
use crate::core::state::QueueState;
use crate::error::QueueError;
use crate::events::{Event, EventKind};
use crate::policies::{BackoffSequence, Priority};

/// Serial execution queue.
///
/// Dropping the queue closes its intake: items already accepted still run, the
/// loop reaches `Stopped` and any pending shutdown callbacks fire.
pub struct SerialQueue {
    shared: Arc<Shared>,
    cfg: QueueConfig,
    backoff: Mutex<BackoffSequence>,
}

impl SerialQueue {
    /// Creates a queue with the default configuration.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Creates a queue with the given configuration and no subscribers.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn with_config(cfg: QueueConfig) -> Self {
        QueueBuilder::new(cfg).build()
    }

    /// Returns a builder for a queue with subscribers.
    pub fn builder(cfg: QueueConfig) -> QueueBuilder {
        QueueBuilder::new(cfg)
    }

    pub(crate) fn from_parts(shared: Arc<Shared>, cfg: QueueConfig) -> Self {
        let backoff = Mutex::new(cfg.backoff());
        Self {
            shared,
            cfg,
            backoff,
        }
    }

    /// Queue label, if configured.
    pub fn label(&self) -> Option<&str> {
        self.shared.label.as_deref()
    }

    /// Priority hint passed to every spawned item.
    pub fn priority(&self) -> Priority {
        self.shared.priority
    }

    /// Configuration the queue was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.cfg
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueueState {
        self.shared.state()
    }

    /// Creates a receiver for this queue's runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.shared.publish(ev);
    }

    /// Enqueues `work` for exclusive execution; the result is discarded.
    ///
    /// Silently dropped if the queue is stopping or stopped.
    pub fn submit<F, Fut, T>(&self, work: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let _ = self.enqueue(work, |_res: Result<T, QueueError>| {});
    }

    /// Enqueues `work` and hands its result to `completion` once it has run.
    ///
    /// If the queue no longer accepts work, `completion` fires right away with
    /// [`QueueError::NotRunning`] and `work` is dropped unexecuted.
    pub fn submit_with_completion<F, Fut, T, C>(&self, work: F, completion: C)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(Result<T, QueueError>) + Send + 'static,
    {
        if let Err(completion) = self.enqueue(work, completion) {
            completion(Err(QueueError::NotRunning));
        }
    }

    /// Enqueues `work` and waits for its result.
    ///
    /// ### Errors
    /// - [`QueueError::NotRunning`] immediately if the queue is stopping or stopped (nothing is enqueued);
    /// - [`QueueError::Panicked`] if the work panicked;
    /// - [`QueueError::Canceled`] if the item was dropped before running (consumer loop gone).
    pub async fn submit_and_await<F, Fut, T>(&self, work: F) -> Result<T, QueueError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let sink = move |res: Result<T, QueueError>| {
            let _ = tx.send(res);
        };
        if self.enqueue(work, sink).is_err() {
            return Err(QueueError::NotRunning);
        }
        rx.await.unwrap_or(Err(QueueError::Canceled))
    }

    /// Like [`submit_and_await`](Self::submit_and_await) for fallible work.
    ///
    /// The work's own error is returned verbatim; queue errors are converted with `E::from`.
    ///
    /// # Example
    /// ```rust
    /// use taskserial::{QueueError, SerialQueue};
    ///
    /// #[derive(Debug, PartialEq)]
    /// enum AppError { Queue(QueueError), Parse(String) }
    ///
    /// impl From<QueueError> for AppError {
    ///     fn from(e: QueueError) -> Self { AppError::Queue(e) }
    /// }
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     let queue = SerialQueue::new();
    ///     let res: Result<u8, AppError> = queue
    ///         .try_submit_and_await(|_ctx| async { "x".parse::<u8>().map_err(|e| AppError::Parse(e.to_string())) })
    ///         .await;
    ///     assert!(matches!(res, Err(AppError::Parse(_))));
    /// }
    /// ```
    pub async fn try_submit_and_await<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: From<QueueError> + Send + 'static,
    {
        self.submit_and_await(work).await?
    }

    /// Requests shutdown without a completion callback.
    pub fn request_shutdown(&self) {
        self.request_shutdown_with(|| {});
    }

    /// Stops accepting work and schedules `on_complete` to run after `Stopped`.
    ///
    /// Idempotent: calling it again while stopping or stopped still fires the new
    /// callback exactly once. With `cancel_on_shutdown`, the running item and every
    /// queued item observe a cancelled token; none of them is aborted.
    pub fn request_shutdown_with<C>(&self, on_complete: C)
    where
        C: FnOnce() + Send + 'static,
    {
        self.shared.completions.add(Box::new(on_complete));
        if let Some(prev) = self.shared.close(self.cfg.cancel_on_shutdown) {
            self.publish(Event::new(EventKind::ShutdownRequested).with_state(prev));
        }
    }

    /// Requests shutdown and waits until the queue is `Stopped`.
    pub async fn shutdown_and_await(&self) {
        let (tx, rx) = oneshot::channel();
        self.request_shutdown_with(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Waits until every item submitted before this call has finished.
    ///
    /// If the queue is stopping, keeps polling (with the queue's [`BackoffSequence`])
    /// until it is `Stopped` or `timeout` elapses. Returns the state observed last;
    /// on timeout that may be a non-terminal state. The in-flight item is never
    /// forcibly stopped.
    pub async fn await_idle(&self, timeout: Option<Duration>) -> QueueState {
        // A deadline past the clock's range means no deadline.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        let sentinel = self.submit_and_await(|_ctx| async {});
        match deadline {
            Some(at) => {
                if time::timeout_at(at, sentinel).await.is_err() {
                    return self.state();
                }
            }
            None => {
                let _ = sentinel.await;
            }
        }

        while self.state() == QueueState::Stopping {
            let mut delay = self.next_poll_delay();
            if let Some(at) = deadline {
                let now = Instant::now();
                if now >= at {
                    break;
                }
                delay = delay.min(at - now);
            }
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                time::sleep(delay).await;
            }
        }
        self.state()
    }

    fn next_poll_delay(&self) -> Duration {
        self.backoff
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }

    /// Fuses `work` with `sink` and enqueues it; hands `sink` back on rejection.
    pub(crate) fn enqueue<F, Fut, T, S>(&self, work: F, sink: S) -> Result<u64, S>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        S: FnOnce(Result<T, QueueError>) + Send + 'static,
    {
        match self
            .shared
            .enqueue((work, sink), |(work, sink)| fuse(work, sink))
        {
            Ok(id) => Ok(id),
            Err((state, (_work, sink))) => {
                self.shared.reject(state);
                Err(sink)
            }
        }
    }
}

impl Default for SerialQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.shared.close(false);
    }
}

impl fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialQueue")
            .field("label", &self.label())
            .field("priority", &self.priority())
            .field("state", &self.state())
            .field(
                "running",
                &self
                    .shared
                    .running()
                    .map(|h| (h.id(), h.priority(), h.is_cancelled())),
            )
            .field("pending_callbacks", &self.shared.completions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_new_queue_becomes_running() {
        let queue = SerialQueue::new();
        assert_eq!(queue.await_idle(None).await, QueueState::Running);
    }

    #[tokio::test]
    async fn test_submit_with_completion_delivers_value() {
        let queue = SerialQueue::new();
        let (tx, rx) = oneshot::channel();
        queue.submit_with_completion(
            |_ctx| async { "done" },
            move |res| {
                let _ = tx.send(res);
            },
        );
        assert_eq!(rx.await.unwrap(), Ok("done"));
    }

    #[tokio::test]
    async fn test_submit_with_completion_after_stop_fires_not_running() {
        let queue = SerialQueue::new();
        queue.shutdown_and_await().await;

        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        let (tx, rx) = oneshot::channel();
        queue.submit_with_completion(
            move |_ctx| async move {
                r.fetch_add(1, Ordering::SeqCst);
            },
            move |res| {
                let _ = tx.send(res);
            },
        );

        assert_eq!(rx.await.unwrap(), Err(QueueError::NotRunning));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panic_is_isolated_to_its_caller() {
        let queue = SerialQueue::new();
        let res = queue
            .submit_and_await(|_ctx| async {
                panic!("work exploded");
            })
            .await;
        assert_eq!(
            res,
            Err::<(), _>(QueueError::Panicked {
                info: "work exploded".into()
            })
        );

        let after = queue.submit_and_await(|_ctx| async { 5 }).await;
        assert_eq!(after, Ok(5));
        assert_eq!(queue.state(), QueueState::Running);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_running_token() {
        let queue = SerialQueue::new();
        let (started_tx, started_rx) = oneshot::channel();
        let (tx, rx) = oneshot::channel();
        queue.submit_with_completion(
            move |ctx: CancellationToken| async move {
                let _ = started_tx.send(());
                ctx.cancelled().await;
                "cancelled"
            },
            move |res| {
                let _ = tx.send(res);
            },
        );

        started_rx.await.unwrap();
        queue.shutdown_and_await().await;
        assert_eq!(rx.await.unwrap(), Ok("cancelled"));
    }

    #[tokio::test]
    async fn test_shutdown_without_cancel_leaves_token_alone() {
        let queue = SerialQueue::with_config(QueueConfig {
            cancel_on_shutdown: false,
            ..QueueConfig::default()
        });
        let (tx, rx) = oneshot::channel();
        queue.submit_with_completion(
            |ctx: CancellationToken| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                ctx.is_cancelled()
            },
            move |res| {
                let _ = tx.send(res);
            },
        );

        queue.shutdown_and_await().await;
        assert_eq!(rx.await.unwrap(), Ok(false));
    }

    #[tokio::test]
    async fn test_queued_items_still_run_during_stopping() {
        let queue = SerialQueue::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let c = count.clone();
            queue.submit(move |_ctx| async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.shutdown_and_await().await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_await_idle_times_out_on_stuck_item() {
        let queue = SerialQueue::new();
        queue.submit(|ctx: CancellationToken| async move {
            ctx.cancelled().await;
        });

        let state = queue.await_idle(Some(Duration::from_millis(30))).await;
        assert_eq!(state, QueueState::Running);

        queue.request_shutdown();
        let state = queue.await_idle(Some(Duration::from_secs(5))).await;
        assert_eq!(state, QueueState::Stopped);
    }

    #[tokio::test]
    async fn test_await_idle_with_unbounded_timeout() {
        let queue = SerialQueue::new();
        queue.submit(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
        });

        let state = queue.await_idle(Some(Duration::MAX)).await;
        assert_eq!(state, QueueState::Running);
    }

    #[tokio::test]
    async fn test_await_idle_while_stopping_polls_until_stopped() {
        let queue = SerialQueue::with_config(QueueConfig {
            cancel_on_shutdown: false,
            ..QueueConfig::default()
        });
        queue.submit(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(40)).await;
        });
        queue.request_shutdown();
        assert_eq!(queue.state(), QueueState::Stopping);

        assert_eq!(queue.await_idle(None).await, QueueState::Stopped);
    }

    #[tokio::test]
    async fn test_dropping_queue_still_fires_callbacks_and_runs_accepted_work() {
        let count = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();
        {
            let queue = SerialQueue::new();
            let c = count.clone();
            queue.submit(move |_ctx| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                c.fetch_add(1, Ordering::SeqCst);
            });
            queue.shared.completions.add(Box::new(move || {
                let _ = tx.send(());
            }));
        }

        rx.await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_events_follow_item_lifecycle() {
        let queue = SerialQueue::with_config(QueueConfig::default().with_label("events"));
        let mut rx = queue.subscribe();

        queue.submit_and_await(|_ctx| async {}).await.unwrap();
        queue.shutdown_and_await().await;

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.queue.as_deref(), Some("events"));
            kinds.push(ev.kind);
        }
        let starting = kinds.iter().position(|k| *k == EventKind::ItemStarting);
        let finished = kinds.iter().position(|k| *k == EventKind::ItemFinished);
        let stopped = kinds.iter().position(|k| *k == EventKind::QueueStopped);
        assert!(starting < finished);
        assert!(finished < stopped);
        assert!(kinds.contains(&EventKind::ShutdownRequested));
    }

    #[tokio::test]
    async fn test_debug_shows_label_and_state() {
        let queue = SerialQueue::with_config(QueueConfig::default().with_label("dbg"));
        queue.await_idle(None).await;
        let text = format!("{queue:?}");
        assert!(text.contains("dbg"));
        assert!(text.contains("Running"));
    }
}

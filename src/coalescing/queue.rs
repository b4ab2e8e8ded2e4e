//! # CoalescingQueue: latest-wins scheduling on top of a [`SerialQueue`].
//!
//! At most one task runs and at most one waits. A new submission replaces the
//! waiting one, which is dropped without ever running.
//!
//! ## Dispatch loop
//! ```text
//! process_next()                       (after every run() and every completion)
//!   ├─► any task Running?  → return
//!   ├─► first is Complete  → remove it, loop
//!   └─► first is Waiting   → mark Running, submit to SerialQueue, return
//!                               └─► work(ctx) ─► finish(id) ─► process_next()
//! ```
//!
//! ## Rules
//! - A burst of submissions while one task runs executes only the last of the burst.
//! - An idle queue always executes the first submission.
//! - Evicted tasks are never started, so they get no cancellation signal.
//! - The task list lock is never held while work runs.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::task_list::{CoalescedState, CoalescedTask, CoalescedWork, TaskList};
use crate::config::QueueConfig;
use crate::core::SerialQueue;
use crate::error::QueueError;
use crate::events::{Event, EventKind};
use crate::policies::BackoffSequence;

/// Result of [`CoalescingQueue::wait_timeout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every accepted task finished before the deadline.
    Completed,
    /// The deadline passed with tasks still tracked.
    TimedOut,
}

struct Coalescer {
    queue: SerialQueue,
    tasks: Mutex<TaskList>,
    next_id: AtomicU64,
}

impl Coalescer {
    fn lock_tasks(&self) -> MutexGuard<'_, TaskList> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn process_next(self: &Arc<Self>) {
        // Lock order: task list, then the inner queue's core lock (taken by `enqueue`).
        let mut tasks = self.lock_tasks();
        loop {
            if tasks.any_running() {
                return;
            }
            let Some((id, state)) = tasks.first_mut().map(|t| (t.id, t.state)) else {
                return;
            };
            match state {
                CoalescedState::Complete => {
                    tasks.remove(id);
                }
                CoalescedState::Waiting => {
                    let Some(work) = tasks.first_mut().and_then(CoalescedTask::start) else {
                        tasks.remove(id);
                        continue;
                    };
                    let this = Arc::clone(self);
                    let sink = move |res: Result<(), QueueError>| this.finish(id, res.err());

                    if self.queue.enqueue(work, sink).is_ok() {
                        self.queue
                            .publish(Event::new(EventKind::TaskDispatched).with_item(id));
                        return;
                    }
                    // Inner queue no longer accepts work: the task can never run.
                    tasks.remove(id);
                    self.queue.publish(
                        Event::new(EventKind::TaskCompleted)
                            .with_item(id)
                            .with_reason(QueueError::NotRunning.as_label()),
                    );
                }
                CoalescedState::Running => return,
            }
        }
    }

    fn finish(self: &Arc<Self>, id: u64, err: Option<QueueError>) {
        if let Some(task) = self.lock_tasks().get_mut(id) {
            task.complete();
        }

        let mut ev = Event::new(EventKind::TaskCompleted).with_item(id);
        if let Some(err) = err {
            ev = ev.with_reason(err.as_message());
        }
        self.queue.publish(ev);

        self.process_next();
    }
}

/// Coalescing scheduler over one [`SerialQueue`].
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use taskserial::CoalescingQueue;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let refreshes = Arc::new(AtomicUsize::new(0));
///     let queue = CoalescingQueue::new();
///
///     for _ in 0..3 {
///         let r = refreshes.clone();
///         queue.run(move |_ctx| async move {
///             tokio::time::sleep(std::time::Duration::from_millis(10)).await;
///             r.fetch_add(1, Ordering::SeqCst);
///         });
///     }
///     queue.wait().await;
///
///     // the middle submission was replaced before it could start
///     assert_eq!(refreshes.load(Ordering::SeqCst), 2);
/// }
/// ```
pub struct CoalescingQueue {
    inner: Arc<Coalescer>,
    backoff: Mutex<BackoffSequence>,
}

impl CoalescingQueue {
    /// Creates a coalescing queue over a fresh default [`SerialQueue`].
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Creates a coalescing queue over a fresh [`SerialQueue`] built from `cfg`.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn with_config(cfg: QueueConfig) -> Self {
        Self::from_queue(SerialQueue::with_config(cfg))
    }

    /// Wraps an existing queue (e.g. one built with subscribers).
    ///
    /// The coalescing layer should be the only submitter to `queue`.
    pub fn from_queue(queue: SerialQueue) -> Self {
        let backoff = Mutex::new(queue.config().backoff());
        Self {
            inner: Arc::new(Coalescer {
                queue,
                tasks: Mutex::new(TaskList::default()),
                next_id: AtomicU64::new(0),
            }),
            backoff,
        }
    }

    /// Label of the underlying queue.
    pub fn label(&self) -> Option<&str> {
        self.inner.queue.label()
    }

    /// Underlying serial queue (state, events, shutdown).
    pub fn queue(&self) -> &SerialQueue {
        &self.inner.queue
    }

    /// `true` when no task is tracked.
    pub fn is_idle(&self) -> bool {
        self.inner.lock_tasks().is_empty()
    }

    /// Submits `work` under the coalescing policy.
    ///
    /// Replaces the currently waiting task, if any; that task never runs.
    pub fn run<F, Fut>(&self, work: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let work: CoalescedWork = Box::new(move |ctx| work(ctx).boxed());

        let evicted = self.inner.lock_tasks().upsert(CoalescedTask::new(id, work));
        self.inner
            .queue
            .publish(Event::new(EventKind::TaskAccepted).with_item(id));
        if let Some(task) = evicted {
            self.inner
                .queue
                .publish(Event::new(EventKind::TaskEvicted).with_item(task.id));
        }

        self.inner.process_next();
    }

    /// Waits until every accepted task has completed and been removed.
    pub async fn wait(&self) {
        loop {
            self.inner.process_next();
            if self.is_idle() {
                return;
            }
            let delay = self.next_poll_delay();
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Like [`wait`](Self::wait), bounded by `timeout`.
    pub async fn wait_timeout(&self, timeout: Duration) -> WaitOutcome {
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(()) => WaitOutcome::Completed,
            Err(_) => WaitOutcome::TimedOut,
        }
    }

    fn next_poll_delay(&self) -> Duration {
        self.backoff
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }
}

impl Default for CoalescingQueue {
    fn default() -> Self {
        Self::new()
    }
}

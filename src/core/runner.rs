//! # Run a single work item.
//!
//! [`TaskRunner`] executes one [`Job`] on its own tokio task with a child
//! cancellation token, and reports its transitions to the caller (the consumer loop).
//!
//! ## Flow
//! ```text
//! TaskRunner::run(report)
//!   ├─► tokio::spawn(job(child_token))
//!   ├─► report(Started, &handle)      → consumer stores RunningTaskHandle
//!   ├─► join.await
//!   │      ├─ Ok(outcome)             → outcome (result already delivered to sink)
//!   │      ├─ Err(panic)              → Panicked (sink itself panicked)
//!   │      └─ Err(cancelled)          → Canceled (runtime shutting down)
//!   └─► report(Finished, &handle)     → consumer clears RunningTaskHandle
//! ```
//!
//! ## Rules
//! - Cancellation is **cooperative**: [`RunningTaskHandle::cancel`] only cancels the token.
//!   The spawned task is never aborted.
//! - Child cancellation does **not** affect the parent (queue-wide) token.
//! - `Finished` is reported exactly once, after the job's future has completed.

use tokio_util::sync::CancellationToken;

use crate::core::job::{Job, Outcome};
use crate::error::QueueError;
use crate::policies::Priority;

/// Transition reported by [`TaskRunner::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    Started,
    Finished,
}

/// Identifies the work item currently in flight.
///
/// Held by the queue only while the item runs; used to propagate cancellation.
#[derive(Clone, Debug)]
pub(crate) struct RunningTaskHandle {
    id: u64,
    priority: Priority,
    token: CancellationToken,
}

impl RunningTaskHandle {
    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub(crate) fn priority(&self) -> Priority {
        self.priority
    }

    /// Requests cooperative cancellation of the running item.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Wraps one job as a cancellable, observable execution.
pub(crate) struct TaskRunner {
    id: u64,
    job: Job,
    token: CancellationToken,
    priority: Priority,
}

impl TaskRunner {
    /// Creates a runner whose token is a child of `parent`.
    pub(crate) fn new(id: u64, job: Job, parent: &CancellationToken, priority: Priority) -> Self {
        Self {
            id,
            job,
            token: parent.child_token(),
            priority,
        }
    }

    /// Spawns the job under the priority hint and waits for it.
    pub(crate) async fn run<R>(self, mut report: R) -> Outcome
    where
        R: FnMut(Transition, &RunningTaskHandle),
    {
        let handle = RunningTaskHandle {
            id: self.id,
            priority: self.priority,
            token: self.token.clone(),
        };

        let join = tokio::spawn((self.job)(self.token));
        report(Transition::Started, &handle);

        let outcome = match join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(QueueError::from_panic(e.into_panic())),
            Err(_) => Err(QueueError::Canceled),
        };

        report(Transition::Finished, &handle);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::fuse;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[tokio::test]
    async fn test_reports_started_then_finished() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let job = fuse(|_ctx| async {}, |_res| {});

        let runner = TaskRunner::new(7, job, &CancellationToken::new(), Priority::High);
        let outcome = runner
            .run(move |t, h| log.lock().unwrap().push((t, h.id(), h.priority())))
            .await;

        assert_eq!(outcome, Ok(()));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (Transition::Started, 7, Priority::High),
                (Transition::Finished, 7, Priority::High)
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_is_cooperative() {
        let parent = CancellationToken::new();
        let handle_slot: Arc<Mutex<Option<RunningTaskHandle>>> = Arc::new(Mutex::new(None));
        let slot = handle_slot.clone();

        let job = fuse(
            |ctx: CancellationToken| async move {
                ctx.cancelled().await;
                "observed"
            },
            |_res| {},
        );
        let runner = TaskRunner::new(1, job, &parent, Priority::Medium);
        let run = tokio::spawn(runner.run(move |t, h| {
            if t == Transition::Started {
                *slot.lock().unwrap() = Some(h.clone());
            }
        }));

        tokio::time::sleep(Duration::from_millis(10)).await;
        let handle = handle_slot.lock().unwrap().clone().expect("started");
        handle.cancel();

        assert_eq!(run.await.unwrap(), Ok(()));
        assert!(handle.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_parent_cancellation_reaches_child() {
        let parent = CancellationToken::new();
        parent.cancel();
        let flag = Arc::new(Mutex::new(false));
        let out = flag.clone();

        let job = fuse(
            |ctx: CancellationToken| async move { ctx.is_cancelled() },
            move |res| *out.lock().unwrap() = res.unwrap(),
        );
        TaskRunner::new(2, job, &parent, Priority::Background)
            .run(|_, _| {})
            .await
            .unwrap();

        assert!(*flag.lock().unwrap());
    }

    #[tokio::test]
    async fn test_panicking_sink_becomes_error() {
        let job = fuse(|_ctx| async {}, |_res| panic!("sink blew up"));
        let outcome = TaskRunner::new(3, job, &CancellationToken::new(), Priority::Medium)
            .run(|_, _| {})
            .await;

        assert_eq!(
            outcome,
            Err(QueueError::Panicked {
                info: "sink blew up".into()
            })
        );
    }
}

//! # Pending shutdown completions.
//!
//! [`PendingCompletions`] collects the callbacks passed to
//! [`SerialQueue::request_shutdown_with`](crate::SerialQueue::request_shutdown_with) and
//! fires them once the queue reaches `Stopped`.
//!
//! ## Rules
//! - Every callback added before or during [`drain`](PendingCompletions::drain) fires **exactly once**.
//! - Callbacks added after the drain fire right away (there is nothing left to wait for).
//! - Callbacks run on a spawned task, never on the caller of `add`/`drain`.
//! - A registry dropped with callbacks still pending fires them instead of losing them.
//! - A panicking callback does not prevent the remaining ones from running.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;

/// Zero-argument callback fired after shutdown completes.
pub(crate) type Callback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Inner {
    callbacks: Vec<Callback>,
    drained: bool,
}

/// Append-only, drain-once collection of shutdown callbacks.
#[derive(Default)]
pub(crate) struct PendingCompletions {
    inner: Mutex<Inner>,
}

impl PendingCompletions {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `cb`; fires it immediately if the registry was already drained.
    pub(crate) fn add(&self, cb: Callback) {
        let mut inner = self.lock();
        if inner.drained {
            drop(inner);
            fire(vec![cb]);
        } else {
            inner.callbacks.push(cb);
        }
    }

    /// Takes every registered callback and fires them asynchronously.
    ///
    /// Returns how many callbacks were handed off.
    pub(crate) fn drain(&self) -> usize {
        let callbacks = {
            let mut inner = self.lock();
            inner.drained = true;
            std::mem::take(&mut inner.callbacks)
        };
        let n = callbacks.len();
        fire(callbacks);
        n
    }

    /// Number of callbacks still waiting for a drain.
    pub(crate) fn len(&self) -> usize {
        self.lock().callbacks.len()
    }
}

impl Drop for PendingCompletions {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        fire(std::mem::take(&mut inner.callbacks));
    }
}

/// Runs `callbacks` on a spawned task when a runtime is available, inline otherwise.
fn fire(callbacks: Vec<Callback>) {
    if callbacks.is_empty() {
        return;
    }
    match Handle::try_current() {
        Ok(rt) => {
            rt.spawn(async move { run_all(callbacks) });
        }
        Err(_) => run_all(callbacks),
    }
}

fn run_all(callbacks: Vec<Callback>) {
    for cb in callbacks {
        let _ = catch_unwind(AssertUnwindSafe(cb));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting(counter: &Arc<AtomicUsize>) -> Callback {
        let c = counter.clone();
        Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_drain_fires_each_callback_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let reg = PendingCompletions::new();
        reg.add(counting(&counter));
        reg.add(counting(&counter));

        assert_eq!(reg.drain(), 2);
        assert_eq!(reg.drain(), 0);
        settle().await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(reg.len(), 0);
    }

    #[tokio::test]
    async fn test_add_after_drain_fires_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let reg = PendingCompletions::new();
        reg.drain();
        reg.add(counting(&counter));
        settle().await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(reg.len(), 0);
    }

    #[tokio::test]
    async fn test_drop_fires_pending_callbacks() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let reg = PendingCompletions::new();
            reg.add(counting(&counter));
            reg.add(counting(&counter));
        }
        settle().await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_without_runtime_runs_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        let reg = PendingCompletions::new();
        reg.add(counting(&counter));
        drop(reg);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_stop_others() {
        let counter = Arc::new(AtomicUsize::new(0));
        let reg = PendingCompletions::new();
        reg.add(Box::new(|| panic!("callback failed")));
        reg.add(counting(&counter));
        reg.drain();
        settle().await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_and_drain_is_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let reg = Arc::new(PendingCompletions::new());

        let mut adders = Vec::new();
        for _ in 0..8 {
            let reg = reg.clone();
            let counter = counter.clone();
            adders.push(tokio::spawn(async move {
                for _ in 0..50 {
                    reg.add(counting(&counter));
                    tokio::task::yield_now().await;
                }
            }));
        }
        tokio::task::yield_now().await;
        reg.drain();
        for a in adders {
            a.await.unwrap();
        }
        settle().await;

        assert_eq!(counter.load(Ordering::SeqCst), 400);
    }
}

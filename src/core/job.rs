//! # Work items as they travel through the intake channel.
//!
//! A caller's closure and its result sink are fused into one boxed [`Job`] at
//! submission time. The consumer loop only ever sees jobs: it hands the job a
//! cancellation token and awaits it, without knowing the result type.
//!
//! ```text
//! work: FnOnce(CancellationToken) -> Fut<T>   sink: FnOnce(Result<T, QueueError>)
//!                 └───────────────┬──────────────────────┘
//!                                 ▼
//!               Job: FnOnce(CancellationToken) -> BoxFuture<Outcome>
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::QueueError;

/// What the runner learns about a finished job (the value itself went to the sink).
pub(crate) type Outcome = Result<(), QueueError>;

/// Type-erased work item plus result sink.
pub(crate) type Job = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, Outcome> + Send>;

/// One accepted job with its per-queue id.
pub(crate) struct Intake {
    pub(crate) id: u64,
    pub(crate) job: Job,
}

/// Fuses `work` and `sink` into a [`Job`].
///
/// Panics raised while building or polling the work future are caught and
/// delivered to `sink` as [`QueueError::Panicked`].
pub(crate) fn fuse<F, Fut, T, S>(work: F, sink: S) -> Job
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
    S: FnOnce(Result<T, QueueError>) + Send + 'static,
{
    Box::new(move |ctx: CancellationToken| {
        async move {
            let res = AssertUnwindSafe(async move { work(ctx).await })
                .catch_unwind()
                .await
                .map_err(QueueError::from_panic);

            let outcome = match &res {
                Ok(_) => Ok(()),
                Err(e) => Err(e.clone()),
            };
            sink(res);
            outcome
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_value_reaches_sink() {
        let got = Arc::new(Mutex::new(None));
        let slot = got.clone();
        let job = fuse(
            |_ctx| async { 41 + 1 },
            move |res| *slot.lock().unwrap() = Some(res),
        );

        assert_eq!(job(CancellationToken::new()).await, Ok(()));
        assert_eq!(*got.lock().unwrap(), Some(Ok(42)));
    }

    #[tokio::test]
    async fn test_panic_is_converted() {
        let got = Arc::new(Mutex::new(None));
        let slot = got.clone();
        let job = fuse(
            |_ctx| async {
                panic!("bad input");
            },
            move |res: Result<(), QueueError>| *slot.lock().unwrap() = Some(res),
        );

        let expected = QueueError::Panicked {
            info: "bad input".into(),
        };
        assert_eq!(job(CancellationToken::new()).await, Err(expected.clone()));
        assert_eq!(*got.lock().unwrap(), Some(Err(expected)));
    }

    #[tokio::test]
    async fn test_work_sees_token() {
        let token = CancellationToken::new();
        token.cancel();
        let got = Arc::new(Mutex::new(None));
        let slot = got.clone();
        let job = fuse(
            |ctx: CancellationToken| async move { ctx.is_cancelled() },
            move |res| *slot.lock().unwrap() = Some(res),
        );

        job(token).await.unwrap();
        assert_eq!(*got.lock().unwrap(), Some(Ok(true)));
    }
}

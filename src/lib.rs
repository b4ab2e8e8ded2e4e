//! # taskserial
//!
//! **taskserial** is a small library for strictly serialized async work on tokio.
//!
//! A [`SerialQueue`] runs submitted work items one at a time, in the order they
//! were enqueued, on a single consumer loop. A [`CoalescingQueue`] layers a
//! latest-wins policy on top: at most one task runs and at most one waits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   callers                          callers
//!      │ run(work)                      │ submit / submit_and_await / shutdown
//!      ▼                                │
//! ┌──────────────────────┐              │
//! │   CoalescingQueue    │              │
//! │ - TaskList (≤1 wait) │              │
//! │ - dispatch loop      │              │
//! └──────────┬───────────┘              │
//!            ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SerialQueue                                                      │
//! │  - state / intake / running handle (one short-held lock)          │
//! │  - PendingCompletions (shutdown callbacks)                        │
//! │  - BackoffSequence (idle polling)                                 │
//! └──────────┬────────────────────────────────────────────────────────┘
//!            ▼ mpsc (FIFO)
//!   ┌──────────────────┐      ┌──────────────┐
//!   │  consumer loop   │ ───► │  TaskRunner  │ ───► work(CancellationToken)
//!   │ (one per queue)  │      └──────────────┘
//!   └────────┬─────────┘
//!            │ publishes
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                 (capacity: QueueConfig::bus_capacity)             │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │    (QueueBuilder)      │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           ┌───────┼───────┐
//!                           ▼       ▼       ▼
//!                        worker1 worker2 workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Created ──► Running ──► Stopping ──► Stopped ──► shutdown callbacks fire
//!    └──────────────────────┘
//!  (shutdown before the loop started)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                    |
//! |-------------------|---------------------------------------------------------------|---------------------------------------|
//! | **Serial queue**  | Ordered, non-overlapping execution with graceful shutdown.    | [`SerialQueue`], [`QueueState`]       |
//! | **Coalescing**    | Latest-wins scheduling, never more than one waiting task.     | [`CoalescingQueue`], [`WaitOutcome`]  |
//! | **Subscriber API**| Hook into queue lifecycle events.                             | [`Subscribe`], [`Event`]              |
//! | **Policies**      | Idle polling delays and priority hints.                       | [`BackoffSequence`], [`Priority`]     |
//! | **Errors**        | Typed queue errors, work errors passed through verbatim.      | [`QueueError`]                        |
//! | **Configuration** | Centralize queue settings.                                    | [`QueueConfig`], [`QueueBuilder`]     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskserial::{QueueConfig, QueueState, SerialQueue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), taskserial::QueueError> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn taskserial::Subscribe>> = vec![Arc::new(taskserial::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn taskserial::Subscribe>> = Vec::new();
//!
//!     let queue = SerialQueue::builder(QueueConfig::default().with_label("db"))
//!         .with_subscribers(subs)
//!         .build();
//!
//!     for i in 0..3 {
//!         queue.submit(move |_ctx| async move { println!("write #{i}") });
//!     }
//!     let rows = queue.submit_and_await(|_ctx| async { 3 }).await?;
//!     assert_eq!(rows, 3);
//!
//!     queue.shutdown_and_await().await;
//!     assert_eq!(queue.state(), QueueState::Stopped);
//!     Ok(())
//! }
//! ```
mod coalescing;
mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use coalescing::{CoalescingQueue, WaitOutcome};
pub use config::QueueConfig;
pub use crate::core::{QueueBuilder, QueueState, SerialQueue};
pub use error::QueueError;
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffSequence, Priority};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

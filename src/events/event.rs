//! # Runtime events emitted by queues.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Queue lifecycle**: state machine transitions and shutdown progress
//! - **Item lifecycle**: one work item starting, finishing, panicking or being rejected
//! - **Coalescing**: acceptance, eviction, dispatch and completion of coalesced tasks
//!
//! The [`Event`] struct carries additional metadata such as timestamps, queue label,
//! item id and priority hint.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskserial::{Event, EventKind, Priority};
//!
//! let ev = Event::new(EventKind::ItemStarting)
//!     .with_queue("ingest")
//!     .with_item(7)
//!     .with_priority(Priority::High);
//!
//! assert_eq!(ev.kind, EventKind::ItemStarting);
//! assert_eq!(ev.queue.as_deref(), Some("ingest"));
//! assert_eq!(ev.item, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::QueueState;
use crate::policies::Priority;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `queue`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `queue`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Queue lifecycle ===
    /// Consumer loop confirmed liveness (`Created → Running`).
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `state`: `Running`
    QueueRunning,

    /// Shutdown was requested; intake closed (`→ Stopping`).
    ///
    /// Emitted once per queue, on the first request only.
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `state`: state observed before the request
    ShutdownRequested,

    /// Intake drained and consumer loop exited (`Stopping → Stopped`).
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `state`: `Stopped`
    QueueStopped,

    /// Pending shutdown callbacks were handed off for execution.
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `count`: number of callbacks drained
    CompletionsDrained,

    // === Item lifecycle ===
    /// A work item left the intake channel and started running.
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `item`: item id (monotonic per queue)
    /// - `priority`: priority hint used for the spawn
    ItemStarting,

    /// A work item finished (its result was delivered).
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `item`: item id
    ItemFinished,

    /// A work item panicked; the panic was converted into an error.
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `item`: item id
    /// - `reason`: panic message
    ItemPanicked,

    /// A submission was refused because the queue is stopping or stopped.
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `state`: state observed at submission time
    ItemRejected,

    // === Coalescing ===
    /// A coalesced task was appended to the task list (state `Waiting`).
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `item`: coalesced task id
    TaskAccepted,

    /// A waiting coalesced task was superseded and discarded without running.
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `item`: evicted task id
    TaskEvicted,

    /// A coalesced task was handed to the serial queue (`Waiting → Running`).
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `item`: coalesced task id
    TaskDispatched,

    /// A coalesced task finished (`Running → Complete`).
    ///
    /// Sets:
    /// - `queue`: queue label
    /// - `item`: coalesced task id
    TaskCompleted,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Label of the emitting queue (or subscriber name for subscriber events).
    pub queue: Option<Arc<str>>,
    /// Work item or coalesced task id.
    pub item: Option<u64>,
    /// Priority hint in effect.
    pub priority: Option<Priority>,
    /// Queue state relevant to the event.
    pub state: Option<QueueState>,
    /// Human-readable reason (panic message, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Generic counter (e.g. drained callbacks).
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            queue: None,
            item: None,
            priority: None,
            state: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches the queue label.
    #[inline]
    pub fn with_queue(mut self, queue: impl Into<Arc<str>>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Attaches the queue label if there is one.
    #[inline]
    pub(crate) fn with_queue_opt(self, queue: Option<&Arc<str>>) -> Self {
        match queue {
            Some(q) => self.with_queue(Arc::clone(q)),
            None => self,
        }
    }

    /// Attaches an item id.
    #[inline]
    pub fn with_item(mut self, id: u64) -> Self {
        self.item = Some(id);
        self
    }

    /// Attaches a priority hint.
    #[inline]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches a queue state.
    #[inline]
    pub fn with_state(mut self, state: QueueState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a counter (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_queue(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_queue(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

//! # Queue configuration.
//!
//! Provides [`QueueConfig`] centralized settings shared by [`SerialQueue`](crate::SerialQueue)
//! and [`CoalescingQueue`](crate::CoalescingQueue).
//!
//! Config is used in two ways:
//! 1. **Queue creation**: `SerialQueue::with_config(cfg)` / `SerialQueue::builder(cfg)`
//! 2. **Coalescing layer**: `CoalescingQueue::with_config(cfg)` builds its inner queue from it
//!
//! ## Sentinel values
//! - `priority = None` → `Priority::Medium`
//! - `poll_backoff = []` → poll without sleeping between checks (single zero step)
//! - `bus_capacity = 0` → clamped to 1
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use taskserial::{Priority, QueueConfig};
//!
//! let cfg = QueueConfig::default()
//!     .with_label("thumbnails")
//!     .with_priority(Priority::Utility);
//!
//! assert_eq!(cfg.label.as_deref(), Some("thumbnails"));
//! assert_eq!(cfg.priority_or_default(), Priority::Utility);
//! assert!(cfg.cancel_on_shutdown);
//! ```

use std::time::Duration;

use crate::policies::{BackoffSequence, DEFAULT_STEPS_MS, Priority};

/// Configuration for a queue.
///
/// ## Field semantics
/// - `label`: Name attached to every event the queue emits
/// - `priority`: Scheduling hint passed to every spawned work item (never reorders)
/// - `cancel_on_shutdown`: Whether shutdown signals cancellation to in-flight and queued items
/// - `poll_backoff`: Steps of the [`BackoffSequence`] used by idle waits
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Optional human-readable queue name.
    pub label: Option<String>,

    /// Priority hint for spawned work.
    pub priority: Option<Priority>,

    /// Signal cooperative cancellation when shutdown is requested.
    ///
    /// When `true`, the running item's token and the tokens of every item still in
    /// the intake channel are cancelled. Items are never aborted: they keep running
    /// until they observe the token (or finish on their own).
    pub cancel_on_shutdown: bool,

    /// Poll delays used while waiting for a queue to become idle or stopped.
    ///
    /// The cursor saturates at the last step and never resets for the lifetime of the queue.
    pub poll_backoff: Vec<Duration>,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl QueueConfig {
    /// Sets the queue label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the priority hint.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns the priority hint, falling back to [`Priority::Medium`].
    #[inline]
    pub fn priority_or_default(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    /// Builds a fresh [`BackoffSequence`] over `poll_backoff`.
    #[inline]
    pub fn backoff(&self) -> BackoffSequence {
        BackoffSequence::new(self.poll_backoff.clone())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `label = None`
    /// - `priority = None` (medium)
    /// - `cancel_on_shutdown = true`
    /// - `poll_backoff = [1ms, 2ms, 5ms, 10ms, 20ms]`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            label: None,
            priority: None,
            cancel_on_shutdown: true,
            poll_backoff: DEFAULT_STEPS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
            bus_capacity: 1024,
        }
    }
}

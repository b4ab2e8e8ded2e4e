//! Scheduling knobs.
//!
//! ## Contents
//! - [`BackoffSequence`] how long to sleep between idle polls (saturating steps)
//! - [`Priority`] scheduling hint carried into spawned work (never reorders)
//!
//! ## Quick wiring
//! ```text
//! QueueConfig { priority: Option<Priority>, poll_backoff: Vec<Duration>, .. }
//!      └─► SerialQueue / CoalescingQueue use:
//!           - priority as the hint for every TaskRunner spawn
//!           - BackoffSequence::new(poll_backoff) for their idle waits
//! ```
//!
//! ## Defaults
//! - `Priority::Medium`.
//! - `BackoffSequence::default()` → 1ms, 2ms, 5ms, 10ms, 20ms (then stays at 20ms).

mod backoff;
mod priority;

pub use backoff::BackoffSequence;
pub(crate) use backoff::DEFAULT_STEPS_MS;
pub use priority::Priority;

//! # Backoff sequence for idle polling.
//!
//! [`BackoffSequence`] hands out progressively larger poll intervals from a fixed
//! list of steps. It is used by [`SerialQueue::await_idle`](crate::SerialQueue::await_idle)
//! while a shutdown is in progress, and by [`CoalescingQueue::wait`](crate::CoalescingQueue::wait)
//! while tracked tasks remain.
//!
//! The cursor advances by one step per call and saturates at the last (largest) step.
//! A sequence is owned by one queue for its whole lifetime and never resets.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskserial::BackoffSequence;
//!
//! let mut seq = BackoffSequence::new(vec![
//!     Duration::from_millis(1),
//!     Duration::from_millis(5),
//!     Duration::from_millis(20),
//! ]);
//!
//! assert_eq!(seq.next(), Duration::from_millis(1));
//! assert_eq!(seq.next(), Duration::from_millis(5));
//! assert_eq!(seq.next(), Duration::from_millis(20));
//!
//! // Saturated: stays on the last step.
//! assert_eq!(seq.next(), Duration::from_millis(20));
//! ```

use std::time::Duration;

/// Default poll steps: 1ms, 2ms, 5ms, 10ms, 20ms.
pub(crate) const DEFAULT_STEPS_MS: [u64; 5] = [1, 2, 5, 10, 20];

/// Stateful generator of poll delays.
///
/// Holds an ordered list of delay magnitudes and a cursor:
/// - [`BackoffSequence::next`] returns the delay at the cursor, then advances it;
/// - the cursor never moves past the last step.
#[derive(Clone, Debug)]
pub struct BackoffSequence {
    steps: Vec<Duration>,
    cursor: usize,
}

impl Default for BackoffSequence {
    /// Returns a sequence over the default steps (1ms → 20ms).
    fn default() -> Self {
        Self::new(
            DEFAULT_STEPS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        )
    }
}

impl BackoffSequence {
    /// Creates a sequence over `steps`.
    ///
    /// An empty list behaves as a single `Duration::ZERO` step.
    pub fn new(steps: Vec<Duration>) -> Self {
        let steps = if steps.is_empty() {
            vec![Duration::ZERO]
        } else {
            steps
        };
        Self { steps, cursor: 0 }
    }

    /// Returns the delay at the cursor and advances the cursor unless it is
    /// already on the last step.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Duration {
        let delay = self.peek();
        if self.cursor + 1 < self.steps.len() {
            self.cursor += 1;
        }
        delay
    }

    /// Returns the delay the next call to [`BackoffSequence::next`] would yield.
    #[inline]
    pub fn peek(&self) -> Duration {
        self.steps[self.cursor]
    }

    /// Returns `true` once the cursor sits on the last step.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.cursor + 1 == self.steps.len()
    }
}

//! # Queue state machine.
//!
//! ```text
//! Created ──► Running ──► Stopping ──► Stopped
//!    │                       ▲
//!    └───────────────────────┘
//! ```
//!
//! - `Created`: accepting submissions, consumer loop not yet confirmed alive.
//! - `Running`: normal operation.
//! - `Stopping`: intake closed; draining in-flight and already accepted items.
//! - `Stopped`: terminal.
//!
//! Any transition outside the table above is rejected.

use std::fmt;

/// Lifecycle state of a [`SerialQueue`](crate::SerialQueue).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueueState {
    /// Accepting submissions; consumer loop not yet confirmed alive.
    Created,
    /// Normal operation.
    Running,
    /// No new submissions; draining accepted work.
    Stopping,
    /// Terminal.
    Stopped,
}

impl QueueState {
    /// Returns `true` if `self → next` is an allowed transition.
    pub fn can_transition_to(self, next: QueueState) -> bool {
        use QueueState::*;
        matches!(
            (self, next),
            (Created, Running) | (Created, Stopping) | (Running, Stopping) | (Stopping, Stopped)
        )
    }

    /// Returns `true` while submissions are accepted (`Created` or `Running`).
    #[inline]
    pub fn is_accepting(self) -> bool {
        matches!(self, QueueState::Created | QueueState::Running)
    }

    /// Returns `true` for the terminal state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, QueueState::Stopped)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueState::Created => "created",
            QueueState::Running => "running",
            QueueState::Stopping => "stopping",
            QueueState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

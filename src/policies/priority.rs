//! # Scheduling priority hint.
//!
//! [`Priority`] is carried by a queue into every work item it spawns and
//! reported on runtime events. It never reorders work: items of one queue always
//! run in intake order. tokio has no task priorities, so the hint is informational
//! for subscribers and for hosts that map it onto their own executors.

use std::fmt;

/// Priority hint attached to a queue and the work it spawns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Maintenance work nobody waits on.
    Background,
    /// Long-running work with visible progress.
    Utility,
    /// No particular preference (default).
    #[default]
    Medium,
    /// Work a user explicitly started and waits for.
    UserInitiated,
    /// Latency-critical work.
    High,
}

impl Priority {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Priority::Background => "background",
            Priority::Utility => "utility",
            Priority::Medium => "medium",
            Priority::UserInitiated => "user_initiated",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_ordering_follows_urgency() {
        assert!(Priority::Background < Priority::Utility);
        assert!(Priority::Medium < Priority::UserInitiated);
        assert!(Priority::UserInitiated < Priority::High);
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(Priority::UserInitiated.to_string(), "user_initiated");
    }
}

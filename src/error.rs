//! Error types used by the queues.
//!
//! [`QueueError`] covers failures raised by the queue itself, never by the work
//! it runs. Errors produced by a work item's own logic are passed through
//! verbatim by [`SerialQueue::try_submit_and_await`](crate::SerialQueue::try_submit_and_await),
//! as long as the caller's error type can absorb a [`QueueError`] (`From<QueueError>`).
//!
//! The enum provides helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by a queue.
///
/// - `NotRunning` is returned synchronously to the call that violated a state precondition.
/// - `Canceled` and `Panicked` are delivered to the one caller awaiting the affected item.
///
/// None of them ever stops the consumer loop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is stopping or stopped and does not accept new work.
    #[error("queue is not running")]
    NotRunning,

    /// The work item was dropped before it could deliver a result, or the work
    /// observed its cancellation token and gave up.
    #[error("queue canceled")]
    Canceled,

    /// The work item panicked; the panic was caught at the runner boundary.
    #[error("work item panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskserial::QueueError;
    ///
    /// assert_eq!(QueueError::NotRunning.as_label(), "queue_not_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::NotRunning => "queue_not_running",
            QueueError::Canceled => "queue_canceled",
            QueueError::Panicked { .. } => "work_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            QueueError::NotRunning => "queue is stopping or stopped".to_string(),
            QueueError::Canceled => "work item canceled".to_string(),
            QueueError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Builds a [`QueueError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        QueueError::Panicked { info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(QueueError::NotRunning.as_label(), "queue_not_running");
        assert_eq!(QueueError::Canceled.as_label(), "queue_canceled");
        assert_eq!(
            QueueError::Panicked { info: "x".into() }.as_label(),
            "work_panicked"
        );
    }

    #[test]
    fn test_panic_payload_str() {
        let err = QueueError::from_panic(Box::new("boom"));
        assert_eq!(err, QueueError::Panicked { info: "boom".into() });
    }

    #[test]
    fn test_panic_payload_string() {
        let err = QueueError::from_panic(Box::new(String::from("kaput")));
        assert_eq!(err.as_message(), "panic: kaput");
    }

    #[test]
    fn test_panic_payload_unknown() {
        let err = QueueError::from_panic(Box::new(42_u8));
        assert_eq!(err.to_string(), "work item panicked: unknown panic");
    }
}

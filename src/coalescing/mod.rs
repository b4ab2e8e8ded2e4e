//! Coalescing layer: latest-wins scheduling over one [`SerialQueue`](crate::SerialQueue).
//!
//! - [`CoalescingQueue`]: `run` / `wait` / `wait_timeout` over a tracked task list;
//! - [`WaitOutcome`]: result of a bounded wait.

mod queue;
mod task_list;

pub use queue::{CoalescingQueue, WaitOutcome};

//! Queue core: intake, consumer loop and lifecycle.
//!
//! The public API from this module is [`SerialQueue`], its [`QueueBuilder`] and
//! the [`QueueState`] it reports.
//!
//! Internal modules:
//! - [`shared`]: state, intake sender and running handle behind one short-held lock;
//! - [`consumer`]: the single loop that runs items one at a time;
//! - [`runner`]: executes one item with a child cancellation token;
//! - [`job`]: fuses work with its result sink into a type-erased job;
//! - [`completions`]: shutdown callbacks fired once the queue is stopped.

mod builder;
mod completions;
mod consumer;
mod job;
mod queue;
mod runner;
mod shared;
mod state;

pub use builder::QueueBuilder;
pub use queue::SerialQueue;
pub use state::QueueState;

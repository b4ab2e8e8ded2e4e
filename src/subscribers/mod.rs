//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the optional built-in `LogWriter` for handling events broadcast through the
//! queue's [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! SerialQueue / consumer loop / CoalescingQueue
//!        │ publish(Event)
//!        ▼
//!       Bus ──► listener (spawned by QueueBuilder::build)
//!                   │
//!                   ▼
//!             SubscriberSet::emit(&Event)
//!              ┌────┴────┬─────────┐
//!              ▼         ▼         ▼
//!          LogWriter  Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by queues, their consumer loops
//! and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `SerialQueue` (submit/shutdown), the consumer loop,
//!   `CoalescingQueue` (task list policy), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the listener spawned by `QueueBuilder::build` (fans out to
//!   `SubscriberSet`), and anyone calling [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

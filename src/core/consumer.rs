//! # Consumer loop: the single logical thread of a queue.
//!
//! ```text
//! consume(shared, rx)
//!   ├─► Created → Running               publish QueueRunning
//!   ├─► while let Some(intake) = rx.recv()
//!   │     ├─► publish ItemStarting
//!   │     ├─► TaskRunner::run()         Started  → shared.set_running(handle)
//!   │     │                             Finished → shared.clear_running()
//!   │     ├─► publish ItemPanicked      (if the work panicked)
//!   │     └─► publish ItemFinished
//!   ├─► (intake closed and drained)
//!   ├─► Stopping → Stopped              publish QueueStopped
//!   └─► completions.drain()             publish CompletionsDrained
//! ```
//!
//! ## Rules
//! - Exactly one loop per queue; items run **one at a time** in intake order.
//! - A failing or panicking item never ends the loop.
//! - The loop ends only when every intake sender is gone.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::job::Intake;
use crate::core::runner::{TaskRunner, Transition};
use crate::core::shared::Shared;
use crate::core::state::QueueState;
use crate::error::QueueError;
use crate::events::{Event, EventKind};

pub(crate) async fn consume(shared: Arc<Shared>, mut rx: mpsc::UnboundedReceiver<Intake>) {
    if shared.transition(QueueState::Running) {
        shared.publish(Event::new(EventKind::QueueRunning).with_state(QueueState::Running));
    }

    while let Some(Intake { id, job }) = rx.recv().await {
        shared.publish(
            Event::new(EventKind::ItemStarting)
                .with_item(id)
                .with_priority(shared.priority),
        );

        let runner = TaskRunner::new(id, job, &shared.token, shared.priority);
        let outcome = runner
            .run(|transition, handle| match transition {
                Transition::Started => shared.set_running(handle.clone()),
                Transition::Finished => shared.clear_running(),
            })
            .await;

        if let Err(QueueError::Panicked { info }) = outcome {
            shared.publish(
                Event::new(EventKind::ItemPanicked)
                    .with_item(id)
                    .with_reason(info),
            );
        }
        shared.publish(Event::new(EventKind::ItemFinished).with_item(id));
    }

    shared.transition(QueueState::Stopped);
    shared.publish(Event::new(EventKind::QueueStopped).with_state(QueueState::Stopped));

    let drained = shared.completions.drain();
    shared.publish(Event::new(EventKind::CompletionsDrained).with_count(drained));
}

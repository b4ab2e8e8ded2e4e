//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [running] queue="ingest"
//! [item-starting] queue="ingest" item=3 priority=medium
//! [item-panicked] queue="ingest" item=3 info="index out of bounds"
//! [item-finished] queue="ingest" item=3
//! [shutdown-requested] queue="ingest" from=Running
//! [stopped] queue="ingest"
//! [completions-drained] queue="ingest" count=2
//! [task-evicted] queue="refresh" task=5
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let queue = e.queue.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::QueueRunning => println!("[running] queue={queue:?}"),
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested] queue={queue:?} from={:?}", e.state);
            }
            EventKind::QueueStopped => println!("[stopped] queue={queue:?}"),
            EventKind::CompletionsDrained => {
                println!("[completions-drained] queue={queue:?} count={:?}", e.count);
            }
            EventKind::ItemStarting => {
                let priority = e.priority.map(|p| p.as_label()).unwrap_or("-");
                println!(
                    "[item-starting] queue={queue:?} item={:?} priority={priority}",
                    e.item
                );
            }
            EventKind::ItemFinished => {
                println!("[item-finished] queue={queue:?} item={:?}", e.item);
            }
            EventKind::ItemPanicked => {
                println!(
                    "[item-panicked] queue={queue:?} item={:?} info={:?}",
                    e.item, e.reason
                );
            }
            EventKind::ItemRejected => {
                println!("[item-rejected] queue={queue:?} state={:?}", e.state);
            }
            EventKind::TaskAccepted => println!("[task-accepted] queue={queue:?} task={:?}", e.item),
            EventKind::TaskEvicted => println!("[task-evicted] queue={queue:?} task={:?}", e.item),
            EventKind::TaskDispatched => {
                println!("[task-dispatched] queue={queue:?} task={:?}", e.item);
            }
            EventKind::TaskCompleted => {
                println!("[task-completed] queue={queue:?} task={:?}", e.item);
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={queue:?} reason={:?}",
                    e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    queue,
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

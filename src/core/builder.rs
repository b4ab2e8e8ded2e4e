use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, mpsc};

use super::{consumer::consume, queue::SerialQueue, shared::Shared};
use crate::{
    config::QueueConfig,
    events::{Bus, EventKind},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`SerialQueue`] with optional subscribers.
pub struct QueueBuilder {
    cfg: QueueConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl QueueBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: QueueConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive queue events (item lifecycle, shutdown, coalescing)
    /// through dedicated workers with bounded queues. Delivery stops once the
    /// queue has stopped and drained its shutdown callbacks.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the queue and spawns its consumer loop.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn build(self) -> SerialQueue {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, set);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let label = self.cfg.label.as_deref().map(Arc::<str>::from);
        let shared = Arc::new(Shared::new(
            label,
            self.cfg.priority_or_default(),
            bus,
            tx,
        ));

        tokio::spawn(consume(Arc::clone(&shared), rx));
        SerialQueue::from_parts(shared, self.cfg)
    }
}

/// Forwards bus events to `set` until the queue is done with them.
fn subscriber_listener(bus: &Bus, set: SubscriberSet) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    set.emit(&ev);
                    if ev.kind == EventKind::CompletionsDrained {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}

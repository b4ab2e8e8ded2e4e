//! # State shared between a queue handle and its consumer loop.
//!
//! One short-held lock protects the queue state, the intake sender and the
//! running-item handle. No work ever runs while it is held, and it is never held
//! across an `.await`.
//!
//! The consumer loop holds an `Arc<Shared>` but never the [`SerialQueue`](crate::SerialQueue)
//! itself; closing the intake sender (shutdown or drop) is the only way the loop ends.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::completions::PendingCompletions;
use crate::core::job::{Intake, Job};
use crate::core::runner::RunningTaskHandle;
use crate::core::state::QueueState;
use crate::events::{Bus, Event, EventKind};
use crate::policies::Priority;

struct Core {
    state: QueueState,
    intake: Option<mpsc::UnboundedSender<Intake>>,
    running: Option<RunningTaskHandle>,
    next_id: u64,
}

pub(crate) struct Shared {
    pub(crate) label: Option<Arc<str>>,
    pub(crate) priority: Priority,
    pub(crate) bus: Bus,
    /// Parent of every item's token; cancelled by shutdown when configured to.
    pub(crate) token: CancellationToken,
    pub(crate) completions: PendingCompletions,
    core: Mutex<Core>,
}

impl Shared {
    pub(crate) fn new(
        label: Option<Arc<str>>,
        priority: Priority,
        bus: Bus,
        intake: mpsc::UnboundedSender<Intake>,
    ) -> Self {
        Self {
            label,
            priority,
            bus,
            token: CancellationToken::new(),
            completions: PendingCompletions::new(),
            core: Mutex::new(Core {
                state: QueueState::Created,
                intake: Some(intake),
                running: None,
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `ev` tagged with this queue's label.
    pub(crate) fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_queue_opt(self.label.as_ref()));
    }

    pub(crate) fn state(&self) -> QueueState {
        self.lock().state
    }

    /// Applies `next` if the transition table allows it.
    pub(crate) fn transition(&self, next: QueueState) -> bool {
        let mut core = self.lock();
        if core.state.can_transition_to(next) {
            core.state = next;
            true
        } else {
            false
        }
    }

    /// Enqueues the job built from `payload` if the queue accepts work.
    ///
    /// `build` only runs when the job is accepted. On rejection, the observed
    /// state is returned together with the untouched payload.
    pub(crate) fn enqueue<P, B>(&self, payload: P, build: B) -> Result<u64, (QueueState, P)>
    where
        B: FnOnce(P) -> Job,
    {
        let mut core = self.lock();
        if !core.state.is_accepting() {
            return Err((core.state, payload));
        }
        let Some(tx) = core.intake.as_ref() else {
            return Err((core.state, payload));
        };

        let id = core.next_id;
        // A send error means the consumer loop is gone; the job (and its sink) is dropped.
        let _ = tx.send(Intake {
            id,
            job: build(payload),
        });
        core.next_id += 1;
        Ok(id)
    }

    /// Moves `Created`/`Running` to `Stopping` and closes the intake.
    ///
    /// Returns the state observed before the call, or `None` if the queue was
    /// already stopping or stopped.
    pub(crate) fn close(&self, cancel: bool) -> Option<QueueState> {
        let mut core = self.lock();
        let prev = core.state;
        if !prev.can_transition_to(QueueState::Stopping) {
            return None;
        }
        core.state = QueueState::Stopping;
        let intake = core.intake.take();
        if cancel {
            if let Some(running) = &core.running {
                running.cancel();
            }
        }
        drop(core);
        drop(intake);

        if cancel {
            self.token.cancel();
        }
        Some(prev)
    }

    pub(crate) fn set_running(&self, handle: RunningTaskHandle) {
        self.lock().running = Some(handle);
    }

    pub(crate) fn clear_running(&self) {
        self.lock().running = None;
    }

    /// Handle of the item in flight, if any.
    pub(crate) fn running(&self) -> Option<RunningTaskHandle> {
        self.lock().running.clone()
    }

    pub(crate) fn reject(&self, state: QueueState) {
        self.publish(Event::new(EventKind::ItemRejected).with_state(state));
    }
}

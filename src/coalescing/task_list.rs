//! # Tracked coalesced tasks.
//!
//! [`TaskList`] holds at most one running and one waiting task in practice:
//! appending to a list whose tail is not running evicts that tail first.
//!
//! ```text
//! [ ]                 + W1 → [W1:waiting]
//! [W1:running]        + W2 → [W1:running, W2:waiting]
//! [W1:running, W2]    + W3 → [W1:running, W3:waiting]   (W2 evicted)
//! ```

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

/// Type-erased coalesced work.
pub(crate) type CoalescedWork = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, ()> + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CoalescedState {
    Waiting,
    Running,
    Complete,
}

pub(crate) struct CoalescedTask {
    pub(crate) id: u64,
    pub(crate) state: CoalescedState,
    work: Option<CoalescedWork>,
}

impl CoalescedTask {
    pub(crate) fn new(id: u64, work: CoalescedWork) -> Self {
        Self {
            id,
            state: CoalescedState::Waiting,
            work: Some(work),
        }
    }

    /// Waiting → Running; hands out the work exactly once.
    pub(crate) fn start(&mut self) -> Option<CoalescedWork> {
        if self.state != CoalescedState::Waiting {
            return None;
        }
        self.state = CoalescedState::Running;
        self.work.take()
    }

    /// Running → Complete. Returns `false` for any other starting state.
    pub(crate) fn complete(&mut self) -> bool {
        if self.state != CoalescedState::Running {
            return false;
        }
        self.state = CoalescedState::Complete;
        true
    }
}

#[derive(Default)]
pub(crate) struct TaskList {
    tasks: Vec<CoalescedTask>,
}

impl TaskList {
    /// Appends `task`, evicting a non-running tail when the list holds more than one entry.
    pub(crate) fn upsert(&mut self, task: CoalescedTask) -> Option<CoalescedTask> {
        let evicted = match self.tasks.last() {
            Some(last) if self.tasks.len() > 1 && last.state != CoalescedState::Running => {
                self.tasks.pop()
            }
            _ => None,
        };
        self.tasks.push(task);
        evicted
    }

    pub(crate) fn any_running(&self) -> bool {
        self.tasks
            .iter()
            .any(|t| t.state == CoalescedState::Running)
    }

    pub(crate) fn first_mut(&mut self) -> Option<&mut CoalescedTask> {
        self.tasks.first_mut()
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut CoalescedTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub(crate) fn remove(&mut self, id: u64) -> Option<CoalescedTask> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn task(id: u64) -> CoalescedTask {
        CoalescedTask::new(id, Box::new(|_ctx| async {}.boxed()))
    }

    #[test]
    fn test_single_waiting_entry_is_not_evicted() {
        let mut list = TaskList::default();
        assert!(list.upsert(task(1)).is_none());
        assert!(list.upsert(task(2)).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_waiting_tail_is_replaced() {
        let mut list = TaskList::default();
        list.upsert(task(1));
        list.first_mut().unwrap().start();
        list.upsert(task(2));

        let evicted = list.upsert(task(3)).expect("tail evicted");
        assert_eq!(evicted.id, 2);
        assert_eq!(evicted.state, CoalescedState::Waiting);
        assert_eq!(list.len(), 2);
        assert!(list.get_mut(3).is_some());
    }

    #[test]
    fn test_running_tail_is_kept() {
        let mut list = TaskList::default();
        list.upsert(task(1));
        list.upsert(task(2));
        list.get_mut(1).unwrap().start();
        list.get_mut(1).unwrap().complete();
        list.get_mut(2).unwrap().start();

        assert!(list.upsert(task(3)).is_none());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_state_transitions_are_one_way() {
        let mut t = task(1);
        assert!(!t.complete());
        assert!(t.start().is_some());
        assert!(t.start().is_none());
        assert!(t.complete());
        assert!(!t.complete());
        assert_eq!(t.state, CoalescedState::Complete);
    }

    #[test]
    fn test_remove_and_running_check() {
        let mut list = TaskList::default();
        list.upsert(task(1));
        assert!(!list.any_running());
        list.first_mut().unwrap().start();
        assert!(list.any_running());

        assert_eq!(list.remove(1).map(|t| t.id), Some(1));
        assert!(list.remove(1).is_none());
        assert!(list.is_empty());
    }
}

//! Update Scheduler - coalesces state changes into one render per tick.
//!
//! ```text
//! set_state ─> enqueue ─┬─> queue (FIFO, every record)
//!                       ├─> dirty set (ordered, one entry per instance)
//!                       └─> first record of a cycle: queue_microtask(flush)
//! ```
//!
//! The flush itself lives on [`Root`](super::Root): it takes the queue, merges
//! every record into its instance's state, then takes the dirty set and
//! renders each instance once.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use serde_json::Value;

use crate::component::InstanceId;
use crate::types::{Props, State};

use super::event_loop::EventLoop;

// =============================================================================
// State Change
// =============================================================================

/// A requested state change.
#[derive(Clone)]
pub enum StateChange {
    /// Shallow-merge this mapping.
    Merge(State),
    /// Compute a partial state from the state and props, then merge it.
    ///
    /// The state passed in is the running merge of the current flush: every
    /// change queued earlier in the same cycle is already applied, so two
    /// queued increments add two. The pre-cycle state stays readable as
    /// `prev_state` during the re-render.
    Compute(Rc<dyn Fn(&State, &Props) -> State>),
}

impl StateChange {
    /// Wrap `f` as a [`StateChange::Compute`].
    pub fn compute(f: impl Fn(&State, &Props) -> State + 'static) -> Self {
        StateChange::Compute(Rc::new(f))
    }

    /// Partial state to merge on top of `state`.
    pub fn resolve(&self, state: &State, props: &Props) -> State {
        match self {
            StateChange::Merge(partial) => partial.clone(),
            StateChange::Compute(f) => f(state, props),
        }
    }
}

impl From<State> for StateChange {
    fn from(value: State) -> Self {
        StateChange::Merge(value)
    }
}

/// JSON objects merge; any other value is ignored with a warning.
impl From<Value> for StateChange {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => StateChange::Merge(map),
            other => {
                tracing::warn!(value = %other, "state change is not an object; ignored");
                StateChange::Merge(State::new())
            }
        }
    }
}

impl fmt::Debug for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateChange::Merge(state) => f.debug_tuple("Merge").field(state).finish(),
            StateChange::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

/// One queued state change for one instance.
#[derive(Debug, Clone)]
pub struct Update {
    pub change: StateChange,
    pub instance: InstanceId,
}

// =============================================================================
// Scheduler
// =============================================================================

/// Pending updates and dirty components of one root.
pub struct Scheduler {
    queue: RefCell<VecDeque<Update>>,
    dirty: RefCell<IndexSet<InstanceId>>,
    event_loop: Rc<EventLoop>,
    flush: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Scheduler {
    /// Scheduler posting its flushes on `event_loop`. Call [`Scheduler::init`] before use.
    pub fn new(event_loop: Rc<EventLoop>) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            dirty: RefCell::new(IndexSet::new()),
            event_loop,
            flush: RefCell::new(None),
        }
    }

    /// Install the flush routine posted on the first update of each cycle.
    pub fn init(&self, flush: impl Fn() + 'static) {
        *self.flush.borrow_mut() = Some(Rc::new(flush));
    }

    /// Queue a state change for `instance`.
    ///
    /// Posts one flush microtask if the queue was empty before this call.
    pub fn enqueue(&self, change: StateChange, instance: InstanceId) {
        let was_empty = {
            let mut queue = self.queue.borrow_mut();
            let was_empty = queue.is_empty();
            queue.push_back(Update { change, instance });
            was_empty
        };
        self.dirty.borrow_mut().insert(instance);
        tracing::trace!(%instance, was_empty, "state change queued");

        if was_empty {
            self.schedule_flush();
        }
    }

    fn schedule_flush(&self) {
        let flush = self.flush.borrow().clone();
        match flush {
            Some(flush) => self.event_loop.queue_microtask(move || flush()),
            None => tracing::warn!("state change queued before the scheduler was initialized"),
        }
    }

    /// Retry the flush as a task once the current one has finished.
    pub(crate) fn defer_flush(&self) {
        let flush = self.flush.borrow().clone();
        if let Some(flush) = flush {
            self.event_loop.post_task(move || flush());
        }
    }

    /// Take every queued update, leaving the queue empty.
    pub fn take_updates(&self) -> VecDeque<Update> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    /// Take the dirty set in insertion order, leaving it empty.
    pub fn take_dirty(&self) -> IndexSet<InstanceId> {
        std::mem::take(&mut *self.dirty.borrow_mut())
    }

    /// Number of queued updates not yet merged.
    pub fn pending_updates(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_dirty(&self, instance: InstanceId) -> bool {
        self.dirty.borrow().contains(&instance)
    }
}

// =============================================================================
// Updater
// =============================================================================

/// Cloneable handle for queueing state changes on one instance.
#[derive(Clone)]
pub struct Updater {
    scheduler: Weak<Scheduler>,
    instance: InstanceId,
}

impl Updater {
    pub(crate) fn new(scheduler: Weak<Scheduler>, instance: InstanceId) -> Self {
        Self {
            scheduler,
            instance,
        }
    }

    /// Updater that is not connected to any scheduler.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self::new(Weak::new(), InstanceId(u64::MAX))
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Queue a state change; applied and rendered on the next flush.
    pub fn set_state(&self, change: impl Into<StateChange>) {
        match self.scheduler.upgrade() {
            Some(scheduler) => scheduler.enqueue(change.into(), self.instance),
            None => {
                tracing::warn!(instance = %self.instance, "set_state after the root was dropped")
            }
        }
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater").field("instance", &self.instance).finish()
    }
}

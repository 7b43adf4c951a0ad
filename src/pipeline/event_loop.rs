//! Single-threaded event loop with task and microtask queues.
//!
//! ```text
//! tick(): run one task ──> drain every microtask (including ones queued meanwhile)
//! ```
//!
//! Microtasks always run before the next task, so work deferred with
//! [`EventLoop::queue_microtask`] lands after the current synchronous code and
//! before any later external event.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct EventLoop {
    tasks: RefCell<VecDeque<Task>>,
    microtasks: RefCell<VecDeque<Task>>,
    ticks: Cell<u64>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an external task (an input event, a timer firing, ...).
    pub fn post_task(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Queue work to run once the current synchronous execution completes.
    pub fn queue_microtask(&self, task: impl FnOnce() + 'static) {
        self.microtasks.borrow_mut().push_back(Box::new(task));
    }

    /// Drain the microtask queue, including microtasks queued while draining.
    ///
    /// Returns the number of microtasks run.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            // Borrow released before running so tasks can queue more work
            let next = self.microtasks.borrow_mut().pop_front();
            let Some(task) = next else { break };
            task();
            ran += 1;
        }
        ran
    }

    /// Run one task (if any), then every pending microtask.
    ///
    /// Returns true while more work is pending.
    pub fn tick(&self) -> bool {
        let next = self.tasks.borrow_mut().pop_front();
        if let Some(task) = next {
            task();
        }
        self.run_microtasks();
        self.ticks.set(self.ticks.get() + 1);
        self.has_pending()
    }

    /// Tick until both queues are empty.
    pub fn run_until_idle(&self) {
        while self.tick() {}
    }

    /// Whether any task or microtask is waiting.
    pub fn has_pending(&self) -> bool {
        !self.tasks.borrow().is_empty() || !self.microtasks.borrow().is_empty()
    }

    pub fn pending_microtasks(&self) -> usize {
        self.microtasks.borrow().len()
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}

//! Update Pipeline
//!
//! Connects state changes to re-renders:
//!
//! ```text
//! Updater::set_state → Scheduler (queue + dirty set) → microtask → Root::flush
//!                                                     → merge states → render_and_commit × dirty
//! ```
//!
//! ## Key Design Principles
//!
//! - **One scheduler per root**: no process-wide queues
//! - **One flush per tick**: the first update of a cycle posts the flush, the rest ride along
//! - **Merge before render**: every queued change is applied before any component renders

pub mod event_loop;
pub mod mount;
pub mod scheduler;

// Re-exports
pub use event_loop::{EventLoop, Task};
pub use mount::Root;
pub use scheduler::{Scheduler, StateChange, Update, Updater};

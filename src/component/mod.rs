//! Component Host - Function and class components behind one instance shape.
//!
//! Both definition styles are resolved once, at instantiation:
//!
//! ```text
//! ComponentDef::Function(render fn) ─┐
//!                                    ├─> ComponentInstance { Box<dyn Component>, props, state, base }
//! ComponentDef::Class(constructor) ──┘
//! ```
//!
//! # Lifecycle
//!
//! - First `set_props`: `component_will_mount` → render → mount → `component_did_mount`
//! - Later `set_props`: `component_will_receive_props` → render → `component_will_update`
//!   → reconcile → `component_did_update`
//! - State flush: render → `component_will_update` → reconcile → `component_did_update`
//!
//! Hooks are trait methods with empty default bodies, so a component only
//! implements the ones it needs.

mod definition;
mod host;
mod instance;

pub use definition::{ClassDef, Component, ComponentDef, Context, FunctionDef};
pub use instance::{ComponentInstance, InstanceId};

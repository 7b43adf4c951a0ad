//! # spark-vdom
//!
//! Declarative virtual-node renderer for Rust.
//!
//! UI is described as immutable [`VNode`] trees. The renderer mounts them into
//! a live tree behind the [`Platform`] trait, then patches that live tree in
//! place whenever a new description arrives, touching only what changed.
//!
//! ## Architecture
//!
//! ```text
//! h() / create_element() → VNode tree → Renderer::mount / reconcile → Platform → live tree
//!                                            ▲
//! Updater::set_state → Scheduler → microtask flush → render_and_commit
//! ```
//!
//! Components come in two flavours, plain render functions and stateful
//! [`Component`] implementations with lifecycle hooks. State changes are
//! queued and coalesced: however many `set_state` calls happen in one tick,
//! each dirty component renders once.
//!
//! ## Modules
//!
//! - [`types`] - Node ids, props, styles, state, events
//! - [`vnode`] - Virtual node model and the `h` factory
//! - [`dom`] - Platform trait and the in-memory [`Document`]
//! - [`renderer`] - Mount, reconcile and attribute synchronization
//! - [`component`] - Component definitions, instances and lifecycle
//! - [`pipeline`] - Scheduler, event loop and the [`Root`] entry point

pub mod component;
pub mod config;
pub mod dom;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod types;
pub mod vnode;

// Re-export commonly used items
pub use types::*;

pub use component::{Component, ComponentDef, ComponentInstance, Context, InstanceId};
pub use config::RenderConfig;
pub use dom::{Document, Mutations, NodeKind, Platform};
pub use error::{DomError, RenderError};
pub use pipeline::{EventLoop, Root, Scheduler, StateChange, Updater};
pub use renderer::{apply_attribute, Renderer};
pub use vnode::{create_element, h, Children, ComponentNode, Element, Tag, VNode};

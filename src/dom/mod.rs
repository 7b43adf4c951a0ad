//! Platform Layer - Live node primitives.
//!
//! The renderer never touches live nodes directly. Every creation, tree edit
//! and attribute write goes through the [`Platform`] trait:
//!
//! ```text
//! VNode tree → Renderer (mount / reconcile) → Platform primitives → live tree
//! ```
//!
//! [`Document`] is the in-memory implementation. Nodes live in an arena and
//! are addressed by generational [`NodeId`](crate::types::NodeId) handles;
//! released slots go back to a free pool for reuse.

mod document;
mod mutations;
mod platform;

pub use document::Document;
pub use mutations::Mutations;
pub use platform::{NodeKind, Platform};

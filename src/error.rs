//! Error types for the platform layer and the renderer.

use thiserror::Error;

use crate::component::InstanceId;
use crate::types::NodeId;

/// Platform precondition violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The handle refers to a released (or never allocated) node.
    #[error("node {0} does not exist")]
    StaleNode(NodeId),

    /// An element-only operation was applied to a text node.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// A text-only operation was applied to an element.
    #[error("node {0} is not a text node")]
    NotText(NodeId),

    /// The reference node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Inserting the node would make it its own ancestor.
    #[error("inserting {child} into {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Errors surfaced by mount, reconcile and the component host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Dom(#[from] DomError),

    /// The instance was unmounted or never existed.
    #[error("component instance {0} is not mounted")]
    UnknownInstance(InstanceId),

    /// A component finished rendering without a live node.
    #[error("component `{0}` produced no live node")]
    MissingBase(String),

    /// A flush was requested while the renderer was already borrowed.
    #[error("renderer is busy; flush requested re-entrantly")]
    Reentrant,
}

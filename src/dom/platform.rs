//! The outbound primitive interface the renderer consumes.

use std::collections::BTreeMap;

use crate::error::DomError;
use crate::types::{EventHandler, NodeId, PropValue};

/// Kind of a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
}

/// Native tree-manipulation primitives.
///
/// All operations are synchronous. Operations on a released handle fail with
/// [`DomError::StaleNode`]; element-only operations on a text node fail with
/// [`DomError::NotAnElement`].
///
/// Tree edits follow DOM semantics: inserting a node that already has a parent
/// moves it.
pub trait Platform {
    // -------------------------------------------------------------------------
    // Creation / teardown
    // -------------------------------------------------------------------------

    fn create_element(&mut self, tag: &str) -> NodeId;

    fn create_text(&mut self, content: &str) -> NodeId;

    /// Destroy a node and its whole subtree. Detaches it first if attached.
    fn release(&mut self, node: NodeId) -> Result<(), DomError>;

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    fn kind(&self, node: NodeId) -> Result<NodeKind, DomError>;

    fn tag_name(&self, node: NodeId) -> Result<&str, DomError>;

    fn text_content(&self, node: NodeId) -> Result<&str, DomError>;

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    /// Snapshot of the children. Text nodes have none.
    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError>;

    fn child_at(&self, node: NodeId, index: usize) -> Result<Option<NodeId>, DomError>;

    fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError>;

    // -------------------------------------------------------------------------
    // Tree edits
    // -------------------------------------------------------------------------

    fn set_text_content(&mut self, node: NodeId, content: &str) -> Result<(), DomError>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError>;

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError>;

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    // -------------------------------------------------------------------------
    // Attributes and properties
    // -------------------------------------------------------------------------

    /// All generic attributes as `(name, value)` pairs. Inline style is not included.
    fn attributes(&self, node: NodeId) -> Result<Vec<(String, String)>, DomError>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError>;

    /// Whether `name` is a writable native property of the node.
    fn has_property(&self, node: NodeId, name: &str) -> bool;

    fn set_property(&mut self, node: NodeId, name: &str, value: &PropValue)
    -> Result<(), DomError>;

    // -------------------------------------------------------------------------
    // Inline style
    // -------------------------------------------------------------------------

    fn style(&self, node: NodeId) -> Result<BTreeMap<String, String>, DomError>;

    /// Replace every inline style with the parsed text.
    fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;

    fn set_style_property(&mut self, node: NodeId, name: &str, value: &str)
    -> Result<(), DomError>;

    fn remove_style_property(&mut self, node: NodeId, name: &str) -> Result<(), DomError>;

    // -------------------------------------------------------------------------
    // Listeners and keys
    // -------------------------------------------------------------------------

    fn listeners(&self, node: NodeId) -> Result<Vec<(String, EventHandler)>, DomError>;

    fn listener(&self, node: NodeId, name: &str) -> Result<Option<EventHandler>, DomError>;

    /// Bind (`Some`) or clear (`None`) a native listener.
    fn set_listener(
        &mut self,
        node: NodeId,
        name: &str,
        handler: Option<EventHandler>,
    ) -> Result<(), DomError>;

    fn key(&self, node: NodeId) -> Result<Option<&str>, DomError>;

    fn set_key(&mut self, node: NodeId, key: Option<&str>) -> Result<(), DomError>;
}

//! In-memory document - arena of live nodes.
//!
//! Manages the lifecycle of node slots:
//! - Generational handles so stale ids are rejected instead of aliasing
//! - Free slot pool for O(1) reuse
//! - Per-node mutation flags for observing exactly which writes happened

use std::collections::BTreeMap;

use crate::error::DomError;
use crate::types::{parse_style_text, style_text, EventHandler, NodeId, PropValue};

use super::mutations::Mutations;
use super::platform::{NodeKind, Platform};

/// Property names every element exposes as writable native properties.
const NATIVE_PROPERTIES: &[&str] = &[
    "value", "checked", "selected", "disabled", "id", "title", "hidden", "tabIndex",
];

// =============================================================================
// Node Storage
// =============================================================================

struct NodeData {
    kind: NodeKind,
    tag: String,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    properties: BTreeMap<String, PropValue>,
    style: BTreeMap<String, String>,
    listeners: BTreeMap<String, EventHandler>,
    key: Option<String>,
    mutations: Mutations,
}

impl NodeData {
    fn new(kind: NodeKind, tag: &str, text: &str) -> Self {
        Self {
            kind,
            tag: tag.to_string(),
            text: text.to_string(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            style: BTreeMap::new(),
            listeners: BTreeMap::new(),
            key: None,
            mutations: Mutations::CREATED,
        }
    }
}

struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Arena-backed live tree.
#[derive(Default)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    created: usize,
}

impl Document {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Slot Access
    // =========================================================================

    fn allocate(&mut self, data: NodeData) -> NodeId {
        self.created += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            data: Some(data),
        });
        NodeId::new(index, 0)
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
            .ok_or(DomError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
            .ok_or(DomError::StaleNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&NodeData, DomError> {
        let node = self.node(id)?;
        if node.kind != NodeKind::Element {
            return Err(DomError::NotAnElement(id));
        }
        Ok(node)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        let node = self.node_mut(id)?;
        if node.kind != NodeKind::Element {
            return Err(DomError::NotAnElement(id));
        }
        Ok(node)
    }

    /// Remove `child` from its current parent, if any.
    fn detach(&mut self, child: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        let parent_node = self.node_mut(parent)?;
        parent_node.children.retain(|&c| c != child);
        parent_node.mutations |= Mutations::CHILDREN;
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Validate that `child` may be inserted under `parent`.
    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(DomError::Cycle { parent, child });
            }
            cursor = self.node(current)?.parent;
        }
        Ok(())
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Result<usize, DomError> {
        self.element(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild { parent, child })
    }

    // =========================================================================
    // Inspection Helpers
    // =========================================================================

    /// Whether the handle refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.data.is_some()).count()
    }

    /// Total number of nodes ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).ok()?.attributes.get(name).map(String::as_str)
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&PropValue> {
        self.node(id).ok()?.properties.get(name)
    }

    pub fn style_property(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).ok()?.style.get(name).map(String::as_str)
    }

    /// Mutation flags accumulated on a node.
    pub fn mutations(&self, id: NodeId) -> Mutations {
        self.node(id).map(|n| n.mutations).unwrap_or_default()
    }

    /// Return and reset the mutation flags of a node.
    pub fn take_mutations(&mut self, id: NodeId) -> Mutations {
        self.node_mut(id)
            .map(|n| std::mem::take(&mut n.mutations))
            .unwrap_or_default()
    }

    /// Reset the mutation flags of every node.
    pub fn clear_mutations(&mut self) {
        for data in self.slots.iter_mut().filter_map(|slot| slot.data.as_mut()) {
            data.mutations = Mutations::NONE;
        }
    }

    /// Serialize a subtree as markup: `<div class="x">hi</div>`.
    ///
    /// Attributes are written in name order, inline style last.
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else { return };
        match node.kind {
            NodeKind::Text => out.push_str(&escape(&node.text)),
            NodeKind::Element => {
                out.push('<');
                out.push_str(&node.tag);
                for (name, value) in &node.attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
                }
                if !node.style.is_empty() {
                    out.push_str(&format!(" style=\"{}\"", escape(&style_text(&node.style))));
                }
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(&node.tag);
                out.push('>');
            }
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// =============================================================================
// Platform
// =============================================================================

impl Platform for Document {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(NodeData::new(NodeKind::Element, tag, ""))
    }

    fn create_text(&mut self, content: &str) -> NodeId {
        self.allocate(NodeData::new(NodeKind::Text, "", content))
    }

    fn release(&mut self, node: NodeId) -> Result<(), DomError> {
        self.detach(node)?;
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let slot = &mut self.slots[id.index as usize];
            if slot.generation != id.generation {
                continue;
            }
            if let Some(data) = slot.data.take() {
                stack.extend(data.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
        Ok(())
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind, DomError> {
        Ok(self.node(node)?.kind)
    }

    fn tag_name(&self, node: NodeId) -> Result<&str, DomError> {
        Ok(&self.element(node)?.tag)
    }

    fn text_content(&self, node: NodeId) -> Result<&str, DomError> {
        let data = self.node(node)?;
        if data.kind != NodeKind::Text {
            return Err(DomError::NotText(node));
        }
        Ok(&data.text)
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.node(node)?.parent)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.node(node)?.children.clone())
    }

    fn child_at(&self, node: NodeId, index: usize) -> Result<Option<NodeId>, DomError> {
        Ok(self.node(node)?.children.get(index).copied())
    }

    fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        let siblings = &self.node(parent)?.children;
        Ok(siblings
            .iter()
            .position(|&c| c == node)
            .and_then(|i| siblings.get(i + 1).copied()))
    }

    fn set_text_content(&mut self, node: NodeId, content: &str) -> Result<(), DomError> {
        let data = self.node_mut(node)?;
        if data.kind != NodeKind::Text {
            return Err(DomError::NotText(node));
        }
        data.text = content.to_string();
        data.mutations |= Mutations::TEXT;
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child)?;
        let parent_node = self.node_mut(parent)?;
        parent_node.children.push(child);
        parent_node.mutations |= Mutations::CHILDREN;
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.position(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.detach(child)?;
        let index = self.position(parent, reference)?;
        let parent_node = self.node_mut(parent)?;
        parent_node.children.insert(index, child);
        parent_node.mutations |= Mutations::CHILDREN;
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, new_child)?;
        self.position(parent, old_child)?;
        if new_child == old_child {
            return Ok(());
        }
        self.detach(new_child)?;
        let index = self.position(parent, old_child)?;
        let parent_node = self.node_mut(parent)?;
        parent_node.children[index] = new_child;
        parent_node.mutations |= Mutations::CHILDREN;
        self.node_mut(new_child)?.parent = Some(parent);
        self.node_mut(old_child)?.parent = None;
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.position(parent, child)?;
        self.detach(child)
    }

    fn attributes(&self, node: NodeId) -> Result<Vec<(String, String)>, DomError> {
        Ok(self
            .element(node)?
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        data.attributes.insert(name.to_string(), value.to_string());
        data.mutations |= Mutations::ATTRIBUTES;
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        data.attributes.remove(name);
        data.mutations |= Mutations::ATTRIBUTES;
        Ok(())
    }

    fn has_property(&self, node: NodeId, name: &str) -> bool {
        self.element(node).is_ok() && NATIVE_PROPERTIES.contains(&name)
    }

    fn set_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        data.properties.insert(name.to_string(), value.clone());
        data.mutations |= Mutations::PROPERTIES;
        Ok(())
    }

    fn style(&self, node: NodeId) -> Result<BTreeMap<String, String>, DomError> {
        Ok(self.element(node)?.style.clone())
    }

    fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        data.style = parse_style_text(text);
        data.mutations |= Mutations::STYLE;
        Ok(())
    }

    fn set_style_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        if value.is_empty() {
            data.style.remove(name);
        } else {
            data.style.insert(name.to_string(), value.to_string());
        }
        data.mutations |= Mutations::STYLE;
        Ok(())
    }

    fn remove_style_property(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        data.style.remove(name);
        data.mutations |= Mutations::STYLE;
        Ok(())
    }

    fn listeners(&self, node: NodeId) -> Result<Vec<(String, EventHandler)>, DomError> {
        Ok(self
            .element(node)?
            .listeners
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn listener(&self, node: NodeId, name: &str) -> Result<Option<EventHandler>, DomError> {
        let data = self.node(node)?;
        Ok(data.listeners.get(name).cloned())
    }

    fn set_listener(
        &mut self,
        node: NodeId,
        name: &str,
        handler: Option<EventHandler>,
    ) -> Result<(), DomError> {
        let data = self.element_mut(node)?;
        match handler {
            Some(handler) => {
                data.listeners.insert(name.to_string(), handler);
            }
            None => {
                data.listeners.remove(name);
            }
        }
        data.mutations |= Mutations::LISTENERS;
        Ok(())
    }

    fn key(&self, node: NodeId) -> Result<Option<&str>, DomError> {
        Ok(self.node(node)?.key.as_deref())
    }

    fn set_key(&mut self, node: NodeId, key: Option<&str>) -> Result<(), DomError> {
        let data = self.node_mut(node)?;
        data.key = key.map(str::to_string);
        data.mutations |= Mutations::KEY;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Virtual Node Model - immutable UI descriptions.
//!
//! A [`VNode`] is built once and never mutated by the renderer. Children are
//! held in a shared slice so the same subtree can be handed to several renders
//! without copying.

mod factory;

pub use factory::{create_element, h, Children, Tag};

use std::rc::Rc;

use crate::component::ComponentDef;
use crate::types::{format_number, Props};

/// Immutable description of desired UI.
#[derive(Clone, Debug, PartialEq)]
pub enum VNode {
    /// Leaf text.
    Text(String),
    /// Platform element with props and ordered children.
    Element(Element),
    /// Component reference; its children come from its own render output.
    Component(ComponentNode),
}

impl VNode {
    /// Empty text, the placeholder for absent / boolean children.
    pub fn empty() -> Self {
        VNode::Text(String::new())
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text(content.into())
    }

    /// Identity key of an element or component node.
    pub fn key(&self) -> Option<String> {
        match self {
            VNode::Text(_) => None,
            VNode::Element(el) => el.props.key(),
            VNode::Component(node) => node.props.key(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            VNode::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        VNode::Text(value.to_string())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        VNode::Text(value)
    }
}

impl From<i64> for VNode {
    fn from(value: i64) -> Self {
        VNode::Text(value.to_string())
    }
}

impl From<f64> for VNode {
    fn from(value: f64) -> Self {
        VNode::Text(format_number(value))
    }
}

/// Booleans render nothing.
impl From<bool> for VNode {
    fn from(_: bool) -> Self {
        VNode::empty()
    }
}

impl<T: Into<VNode>> From<Option<T>> for VNode {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(VNode::empty, Into::into)
    }
}

impl From<Element> for VNode {
    fn from(value: Element) -> Self {
        VNode::Element(value)
    }
}

impl From<ComponentNode> for VNode {
    fn from(value: ComponentNode) -> Self {
        VNode::Component(value)
    }
}

// =============================================================================
// Element
// =============================================================================

/// Platform element description.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: String,
    props: Props,
    children: Rc<[VNode]>,
}

impl Element {
    pub fn new(tag: impl Into<String>, props: Props, children: Vec<VNode>) -> Self {
        Self {
            tag: tag.into(),
            props,
            children: children.into(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[VNode] {
        &self.children
    }
}

// =============================================================================
// Component Node
// =============================================================================

/// Reference to a component definition with the props to render it with.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentNode {
    def: ComponentDef,
    props: Props,
}

impl ComponentNode {
    pub fn new(def: ComponentDef, props: Props) -> Self {
        Self { def, props }
    }

    pub fn def(&self) -> &ComponentDef {
        &self.def
    }

    pub fn props(&self) -> &Props {
        &self.props
    }
}

//! Node factory - `create_element(tag, props, children)`.

use crate::component::ComponentDef;
use crate::types::Props;

use super::{ComponentNode, Element, VNode};

/// What a node is created from: a platform tag name or a component definition.
#[derive(Clone, Debug)]
pub enum Tag {
    Element(String),
    Component(ComponentDef),
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::Element(value.to_string())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::Element(value)
    }
}

impl From<ComponentDef> for Tag {
    fn from(value: ComponentDef) -> Self {
        Tag::Component(value)
    }
}

impl From<&ComponentDef> for Tag {
    fn from(value: &ComponentDef) -> Self {
        Tag::Component(value.clone())
    }
}

/// Build an element or component node.
///
/// Missing props become empty props. Children are flattened into one ordered
/// sequence. Children given to a component tag are dropped: a component's
/// children come from its own render output.
pub fn create_element<C, I>(tag: impl Into<Tag>, props: Option<Props>, children: I) -> VNode
where
    I: IntoIterator<Item = C>,
    C: Into<VNode>,
{
    let props = props.unwrap_or_default();
    match tag.into() {
        Tag::Element(tag) => {
            let children: Vec<VNode> = children.into_iter().map(Into::into).collect();
            VNode::Element(Element::new(tag, props, children))
        }
        Tag::Component(def) => {
            let dropped = children.into_iter().count();
            if dropped > 0 {
                tracing::debug!(component = def.name(), dropped, "component children ignored");
            }
            VNode::Component(ComponentNode::new(def, props))
        }
    }
}

/// Short alias for [`create_element`] with non-optional props.
pub fn h<C, I>(tag: impl Into<Tag>, props: Props, children: I) -> VNode
where
    I: IntoIterator<Item = C>,
    C: Into<VNode>,
{
    create_element(tag, Some(props), children)
}

// =============================================================================
// Children
// =============================================================================

/// Ordered child list built from mixed sources, flattened as it grows.
///
/// ```ignore
/// let mut children = Children::new();
/// children.push("title");
/// children.extend(items.iter().map(render_item));
/// h("ul", Props::new(), children)
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Children(Vec<VNode>);

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, child: impl Into<VNode>) -> &mut Self {
        self.0.push(child.into());
        self
    }

    /// Append every item of a nested sequence in order.
    pub fn extend<C: Into<VNode>>(&mut self, children: impl IntoIterator<Item = C>) -> &mut Self {
        self.0.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Children {
    type Item = VNode;
    type IntoIter = std::vec::IntoIter<VNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<C: Into<VNode>> FromIterator<C> for Children {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

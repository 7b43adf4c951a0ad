//! Mount renderer - build a live subtree from a virtual node.

use crate::component::InstanceId;
use crate::dom::Platform;
use crate::error::RenderError;
use crate::types::{NodeId, KEY_PROP};
use crate::vnode::VNode;

use super::attributes::apply_attribute;
use super::Renderer;

impl<P: Platform> Renderer<P> {
    /// Create a detached live subtree for `vnode`.
    ///
    /// `composer` is the component whose render produced `vnode` directly; a
    /// component node mounted on its behalf becomes its `child`. The root of a
    /// composed subtree takes no key of its own, the composing component's key
    /// is written by whoever mounted that component.
    pub fn mount(
        &mut self,
        vnode: &VNode,
        composer: Option<InstanceId>,
    ) -> Result<NodeId, RenderError> {
        match vnode {
            VNode::Text(text) => Ok(self.platform.create_text(text)),
            VNode::Component(node) => self.mount_component(node, composer),
            VNode::Element(element) => {
                let node = self.platform.create_element(element.tag());
                if composer.is_none() {
                    self.sync_key(node, element.props())?;
                }

                for (name, value) in element.props().iter().filter(|(name, _)| *name != KEY_PROP) {
                    apply_attribute(&mut self.platform, &self.config, node, name, value)?;
                }
                for child in element.children() {
                    let child = self.mount(child, None)?;
                    self.platform.append_child(node, child)?;
                }
                Ok(node)
            }
        }
    }

    /// Replace the content of `container` with a fresh mount of `vnode`.
    pub fn mount_into(&mut self, vnode: &VNode, container: NodeId) -> Result<NodeId, RenderError> {
        for previous in self.platform.children(container)? {
            self.platform.remove_child(container, previous)?;
            self.discard(previous)?;
        }
        let node = self.mount(vnode, None)?;
        self.platform.append_child(container, node)?;
        tracing::debug!(%container, %node, "mounted");
        Ok(node)
    }
}

//! Reconciler - patch a live subtree in place to match a new virtual node.
//!
//! Live nodes are reused whenever their type still matches, so untouched
//! text, attributes and children cost no platform writes at all.
//!
//! # Algorithm
//!
//! 1. Component vnode: reuse the instance when the definition matches,
//!    otherwise unmount it and mount a new one at the same position
//! 2. Text vnode: rewrite content only when it differs
//! 3. Element vnode: on tag change create a new element and move the old
//!    children into it, then diff children, then diff attributes
//!
//! # Children
//!
//! Live children are split into a keyed pool and an unkeyed pool. Each virtual
//! child claims its keyed counterpart, or the first unkeyed node of the same
//! type, is reconciled against it and is moved into position. Whatever is left
//! unclaimed at the end is removed and released.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::component::InstanceId;
use crate::dom::{NodeKind, Platform};
use crate::error::RenderError;
use crate::types::{NodeId, Props, KEY_PROP};
use crate::vnode::{ComponentNode, Element, VNode};

use super::attributes::{apply_attribute, is_applied, leaves_nothing, live_props};
use super::Renderer;

impl<P: Platform> Renderer<P> {
    /// Bring `live` in line with `vnode`, returning the node that now represents it.
    ///
    /// With no `live` node this is a plain mount. The returned node differs
    /// from `live` only when the type changed; it then sits at `live`'s old
    /// position and `live` is released.
    ///
    /// `composer` is the component re-rendering into its own base. Without
    /// one, `live` is a child slot and any component owning it is unmounted
    /// before the slot is patched as a plain node.
    pub fn reconcile(
        &mut self,
        live: Option<NodeId>,
        vnode: &VNode,
        composer: Option<InstanceId>,
    ) -> Result<NodeId, RenderError> {
        match vnode {
            VNode::Component(node) => self.diff_component(live, node, composer),
            VNode::Text(text) => {
                self.release_composed(live, composer);
                match live {
                    Some(live) => self.diff_text(live, text, composer),
                    None => self.mount(vnode, composer),
                }
            }
            VNode::Element(element) => {
                self.release_composed(live, composer);
                match live {
                    Some(live) => self.diff_element(live, element, composer),
                    None => self.mount(vnode, composer),
                }
            }
        }
    }

    /// Unmount the component that rendered `live` when it is replaced by a
    /// plain node.
    fn release_composed(&mut self, live: Option<NodeId>, composer: Option<InstanceId>) {
        let previous = match composer {
            Some(composer) => self.instances.get(&composer).and_then(|i| i.child),
            None => live.and_then(|node| self.owners.get(&node).copied()),
        };
        if let Some(previous) = previous {
            self.unmount(previous);
        }
    }

    fn diff_text(
        &mut self,
        live: NodeId,
        text: &str,
        composer: Option<InstanceId>,
    ) -> Result<NodeId, RenderError> {
        if self.platform.kind(live)? == NodeKind::Text {
            if self.platform.text_content(live)? != text {
                self.platform.set_text_content(live, text)?;
            }
            if composer.is_none() && self.platform.key(live)?.is_some() {
                self.platform.set_key(live, None)?;
            }
            return Ok(live);
        }
        let node = self.platform.create_text(text);
        self.replace_node(live, node, composer)?;
        Ok(node)
    }

    fn diff_element(
        &mut self,
        live: NodeId,
        element: &Element,
        composer: Option<InstanceId>,
    ) -> Result<NodeId, RenderError> {
        let out = if self.same_tag(live, element.tag())? {
            live
        } else {
            let out = self.platform.create_element(element.tag());
            for child in self.platform.children(live)? {
                self.platform.append_child(out, child)?;
            }
            self.replace_node(live, out, composer)?;
            tracing::trace!(from = %live, to = %out, tag = element.tag(), "element retagged");
            out
        };

        // A component's base carries the key its owner was matched by.
        if composer.is_none() {
            self.sync_key(out, element.props())?;
        }

        if !element.children().is_empty() || self.platform.child_at(out, 0)?.is_some() {
            self.diff_children(out, element.children())?;
        }
        self.diff_attributes(out, element.props())?;
        Ok(out)
    }

    // =========================================================================
    // Children
    // =========================================================================

    pub(crate) fn diff_children(
        &mut self,
        parent: NodeId,
        vchildren: &[VNode],
    ) -> Result<(), RenderError> {
        let mut keyed: HashMap<String, NodeId> = HashMap::new();
        let mut unkeyed: Vec<Option<NodeId>> = Vec::new();
        for child in self.platform.children(parent)? {
            match self.platform.key(child)?.map(str::to_owned) {
                Some(key) if !keyed.contains_key(&key) => {
                    keyed.insert(key, child);
                }
                _ => unkeyed.push(Some(child)),
            }
        }

        let keys = claim_keys(vchildren);
        let mut min = 0;

        for (i, vchild) in vchildren.iter().enumerate() {
            let matched = match &keys[i] {
                Some(key) => keyed.remove(key),
                None => self.take_unkeyed(&mut unkeyed, &mut min, vchild)?,
            };
            let child = self.reconcile(matched, vchild, None)?;

            match self.platform.child_at(parent, i)? {
                Some(current) if current == child => {}
                None => self.platform.append_child(parent, child)?,
                Some(current) => {
                    let (later_keys, later) = (&keys[i + 1..], &vchildren[i + 1..]);
                    let superseded = self.platform.next_sibling(current)? == Some(child)
                        && !self.claimable(current, &keyed, &unkeyed, later_keys, later)?;
                    if superseded {
                        self.platform.remove_child(parent, current)?;
                    } else {
                        self.platform.insert_before(parent, child, current)?;
                    }
                }
            }
        }

        for stale in keyed.into_values().chain(unkeyed.into_iter().flatten()) {
            if self.platform.parent(stale)? == Some(parent) {
                self.platform.remove_child(parent, stale)?;
            }
            self.discard(stale)?;
        }
        Ok(())
    }

    /// First unclaimed unkeyed live node of the same type as `vchild`.
    fn take_unkeyed(
        &self,
        unkeyed: &mut [Option<NodeId>],
        min: &mut usize,
        vchild: &VNode,
    ) -> Result<Option<NodeId>, RenderError> {
        for j in *min..unkeyed.len() {
            let Some(candidate) = unkeyed[j] else { continue };
            if !self.same_node_type(candidate, vchild)? {
                continue;
            }
            unkeyed[j] = None;
            while *min < unkeyed.len() && unkeyed[*min].is_none() {
                *min += 1;
            }
            return Ok(Some(candidate));
        }
        Ok(None)
    }

    /// Whether a later virtual child can still claim the unclaimed live `node`.
    fn claimable(
        &self,
        node: NodeId,
        keyed: &HashMap<String, NodeId>,
        unkeyed: &[Option<NodeId>],
        keys: &[Option<String>],
        vchildren: &[VNode],
    ) -> Result<bool, RenderError> {
        if keyed.values().any(|&pooled| pooled == node) {
            let key = self.platform.key(node)?;
            return Ok(keys.iter().any(|k| k.as_deref() == key));
        }
        if unkeyed.contains(&Some(node)) {
            for (key, vchild) in keys.iter().zip(vchildren) {
                if key.is_none() && self.same_node_type(node, vchild)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn same_tag(&self, live: NodeId, tag: &str) -> Result<bool, RenderError> {
        Ok(self.platform.kind(live)? == NodeKind::Element
            && self.platform.tag_name(live)?.eq_ignore_ascii_case(tag))
    }

    /// Whether `live` can be patched into `vnode` without replacement.
    pub(crate) fn same_node_type(&self, live: NodeId, vnode: &VNode) -> Result<bool, RenderError> {
        Ok(match vnode {
            VNode::Text(_) => self.platform.kind(live)? == NodeKind::Text,
            VNode::Element(element) => self.same_tag(live, element.tag())?,
            VNode::Component(node) => self
                .owners
                .get(&live)
                .and_then(|id| self.instances.get(id))
                .is_some_and(|instance| instance.def.same(node.def())),
        })
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Make the live attributes, style and listeners of `node` match `props`.
    ///
    /// Props the node carried before but `props` no longer names are erased.
    /// Props whose live value already matches are not written again.
    pub(crate) fn diff_attributes(
        &mut self,
        node: NodeId,
        props: &Props,
    ) -> Result<(), RenderError> {
        let live = live_props(&self.platform, node)?;
        let next: BTreeMap<String, (&str, _)> = props
            .iter()
            .filter(|(name, _)| *name != KEY_PROP)
            .map(|(name, value)| (self.config.attribute_name(name), (name, value)))
            .collect();

        for name in live.keys().filter(|name| !next.contains_key(*name)) {
            apply_attribute(&mut self.platform, &self.config, node, name, &Default::default())?;
        }

        for (normalized, (name, value)) in &next {
            let applied = match live.get(normalized) {
                Some(current) => is_applied(current, value, &self.config),
                None => leaves_nothing(name, value, &self.config),
            };
            if !applied {
                apply_attribute(&mut self.platform, &self.config, node, name, value)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Components
    // =========================================================================

    fn diff_component(
        &mut self,
        live: Option<NodeId>,
        node: &ComponentNode,
        composer: Option<InstanceId>,
    ) -> Result<NodeId, RenderError> {
        let existing = match composer {
            Some(composer) => self.instances.get(&composer).and_then(|i| i.child),
            None => live.and_then(|live| self.owners.get(&live).copied()),
        };

        if let Some(id) = existing {
            let same = self
                .instances
                .get(&id)
                .is_some_and(|instance| instance.def.same(node.def()));
            if same {
                let base = self.set_props(id, node.props().clone())?;
                if composer.is_none() {
                    self.sync_key(base, node.props())?;
                }
                return Ok(base);
            }
            tracing::debug!(%id, next = node.def().name(), "component replaced");
            self.unmount(id);
        }

        let base = self.mount_component(node, composer)?;
        if let Some(old) = live {
            if old != base {
                self.replace_node(old, base, composer)?;
            }
        }
        Ok(base)
    }
}

/// Per-child identity keys; a repeated key falls back to unkeyed matching.
fn claim_keys(vchildren: &[VNode]) -> Vec<Option<String>> {
    let mut seen = HashSet::new();
    vchildren
        .iter()
        .map(|vchild| {
            let key = vchild.key()?;
            if seen.insert(key.clone()) {
                Some(key)
            } else {
                tracing::warn!(key, "duplicate key among siblings; matching it as unkeyed");
                None
            }
        })
        .collect()
}

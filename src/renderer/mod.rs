//! Renderer - Mount, reconcile and attribute synchronization.
//!
//! One [`Renderer`] owns a platform, the mounted component instances and the
//! live-node → component side table:
//!
//! ```text
//! mount(vnode)            → brand-new live subtree
//! reconcile(live, vnode)  → in-place patch, replace on type change
//! apply_attribute(..)     → one prop onto one live node
//! ```
//!
//! # Ownership
//!
//! A live node that is the root of a component's output maps to the outermost
//! instance rendering it (`owners`). Components that render another component
//! directly are linked through `parent` / `child` and share one base node.
//! Nodes that leave the tree are released, and any component owning a node in
//! the released subtree is unmounted.

mod attributes;
mod diff;
mod mount;

pub use attributes::apply_attribute;

use std::collections::HashMap;
use std::rc::Weak;

use crate::component::{ComponentInstance, InstanceId};
use crate::config::RenderConfig;
use crate::dom::Platform;
use crate::error::RenderError;
use crate::pipeline::Scheduler;
use crate::types::{NodeId, Props};

/// Live tree plus the component instances rendering into it.
pub struct Renderer<P: Platform> {
    pub(crate) platform: P,
    pub(crate) config: RenderConfig,
    pub(crate) instances: HashMap<InstanceId, ComponentInstance>,
    pub(crate) owners: HashMap<NodeId, InstanceId>,
    pub(crate) next_instance: u64,
    pub(crate) scheduler: Weak<Scheduler>,
}

impl<P: Platform> Renderer<P> {
    /// Create a renderer over `platform`. Updaters it hands out queue on `scheduler`.
    pub fn new(platform: P, config: RenderConfig, scheduler: Weak<Scheduler>) -> Self {
        Self {
            platform,
            config,
            instances: HashMap::new(),
            owners: HashMap::new(),
            next_instance: 0,
            scheduler,
        }
    }

    /// The live tree.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the live tree, bypassing reconciliation.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Configuration this renderer was created with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Mounted instance `id`, if it is still mounted.
    pub fn instance(&self, id: InstanceId) -> Option<&ComponentInstance> {
        self.instances.get(&id)
    }

    /// Whether instance `id` is still mounted.
    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Number of mounted instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Outermost component whose output root is `node`.
    pub fn owner_of(&self, node: NodeId) -> Option<InstanceId> {
        self.owners.get(&node).copied()
    }

    // =========================================================================
    // Node Teardown
    // =========================================================================

    /// Put `new` where `old` sits in its parent, then release `old`.
    ///
    /// With a `composer`, `old` was that component's own base: its back-reference
    /// and key move to `new` instead of unmounting the component.
    pub(crate) fn replace_node(
        &mut self,
        old: NodeId,
        new: NodeId,
        composer: Option<InstanceId>,
    ) -> Result<(), RenderError> {
        if let Some(parent) = self.platform.parent(old)? {
            self.platform.replace_child(parent, new, old)?;
        }
        tracing::trace!(%old, %new, "node replaced");

        if composer.is_some() {
            self.owners.remove(&old);
            let key = self.platform.key(old)?.map(str::to_owned);
            if key.is_some() && self.platform.key(new)?.is_none() {
                self.platform.set_key(new, key.as_deref())?;
            }
        }
        self.discard(old)
    }

    /// Release a detached subtree, unmounting every component it hosts.
    pub(crate) fn discard(&mut self, node: NodeId) -> Result<(), RenderError> {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(owner) = self.owners.remove(&current) {
                self.unmount(owner);
            }
            stack.extend(self.platform.children(current)?);
        }
        self.platform.release(node)?;
        Ok(())
    }

    /// Store the identity key from `props` on `node`, clearing it when `props`
    /// has none. Writes only when the live key differs.
    pub(crate) fn sync_key(&mut self, node: NodeId, props: &Props) -> Result<(), RenderError> {
        let key = props.key();
        if self.platform.key(node)? != key.as_deref() {
            self.platform.set_key(node, key.as_deref())?;
        }
        Ok(())
    }
}

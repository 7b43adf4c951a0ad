//! Component host - instantiate, render and commit component instances.
//!
//! ```text
//! set_props ─► will_mount | will_receive_props
//!     └─► render_and_commit ─► render ─► will_update? ─► reconcile | mount
//!                                   └─► did_mount | did_update ─► bind base
//! ```
//!
//! After every commit the new base is propagated up the chain of components
//! rendering each other directly, and the live node is mapped to the
//! outermost of them.

use crate::dom::Platform;
use crate::error::RenderError;
use crate::pipeline::{Update, Updater};
use crate::renderer::Renderer;
use crate::types::{NodeId, Props};
use crate::vnode::ComponentNode;

use super::definition::ComponentDef;
use super::instance::{ComponentInstance, InstanceId};

impl<P: Platform> Renderer<P> {
    /// Create an instance of `def`: construct the behaviour, compute the
    /// initial state and attach an updater. Nothing is rendered yet.
    pub fn instantiate(&mut self, def: &ComponentDef, props: &Props) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;

        let component = def.construct(props);
        let state = component.initial_state(props);
        self.instances.insert(
            id,
            ComponentInstance {
                id,
                def: def.clone(),
                component,
                props: props.clone(),
                state,
                prev_state: None,
                base: None,
                parent: None,
                child: None,
                updater: Updater::new(self.scheduler.clone(), id),
            },
        );
        tracing::debug!(component = def.name(), %id, "component instantiated");
        id
    }

    /// Instantiate and render a component node, linking it under `composer`.
    pub(crate) fn mount_component(
        &mut self,
        node: &ComponentNode,
        composer: Option<InstanceId>,
    ) -> Result<NodeId, RenderError> {
        let id = self.instantiate(node.def(), node.props());
        if let Some(composer) = composer {
            if let Some(parent) = self.instances.get_mut(&composer) {
                parent.child = Some(id);
            }
            if let Some(child) = self.instances.get_mut(&id) {
                child.parent = Some(composer);
            }
        }
        let base = self.set_props(id, node.props().clone())?;
        if composer.is_none() {
            self.sync_key(base, node.props())?;
        }
        Ok(base)
    }

    /// Hand new props to an instance and re-render it synchronously.
    pub fn set_props(&mut self, id: InstanceId, props: Props) -> Result<NodeId, RenderError> {
        let instance = self
            .instances
            .get_mut(&id)
            .ok_or(RenderError::UnknownInstance(id))?;
        if instance.base.is_none() {
            instance.hook(|c, cx| c.component_will_mount(cx));
        } else {
            instance.hook(|c, cx| c.component_will_receive_props(&props, cx));
        }
        instance.props = props;
        self.render_and_commit(id)
    }

    /// Render an instance and commit the output against its current base.
    pub fn render_and_commit(&mut self, id: InstanceId) -> Result<NodeId, RenderError> {
        let instance = self
            .instances
            .get_mut(&id)
            .ok_or(RenderError::UnknownInstance(id))?;
        let vnode = instance.render();
        let previous = instance.base;
        if previous.is_some() {
            instance.hook(|c, cx| c.component_will_update(cx));
        }

        let base = match previous {
            Some(base) => self.reconcile(Some(base), &vnode, Some(id))?,
            None => self.mount(&vnode, Some(id))?,
        };

        let instance = self
            .instances
            .get_mut(&id)
            .ok_or(RenderError::UnknownInstance(id))?;
        if previous.is_some() {
            instance.hook(|c, cx| c.component_did_update(cx));
        } else {
            instance.hook(|c, cx| c.component_did_mount(cx));
        }

        self.bind_base(id, previous, base);
        tracing::trace!(%id, %base, "component committed");
        Ok(base)
    }

    /// Record `base` on `id` and every component rendering it directly.
    fn bind_base(&mut self, id: InstanceId, previous: Option<NodeId>, base: NodeId) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.base = Some(base);
        }
        if let Some(previous) = previous {
            if previous != base {
                self.owners.remove(&previous);
            }
        }

        let mut top = id;
        while let Some(parent) = self.instances.get(&top).and_then(|i| i.parent) {
            let Some(instance) = self.instances.get_mut(&parent) else {
                break;
            };
            instance.base = Some(base);
            top = parent;
        }
        self.owners.insert(base, top);
    }

    /// Drop an instance and the chain of components it renders directly.
    ///
    /// Live nodes are left alone; the caller releases or reuses them.
    pub(crate) fn unmount(&mut self, id: InstanceId) {
        let Some(instance) = self.instances.remove(&id) else {
            return;
        };
        tracing::debug!(component = instance.def.name(), %id, "component unmounted");

        if let Some(base) = instance.base {
            if self.owners.get(&base) == Some(&id) {
                self.owners.remove(&base);
            }
        }
        if let Some(parent) = instance.parent.and_then(|p| self.instances.get_mut(&p)) {
            if parent.child == Some(id) {
                parent.child = None;
            }
        }
        if let Some(child) = instance.child {
            self.unmount(child);
        }
    }

    // =========================================================================
    // Batched Updates
    // =========================================================================

    /// Merge one queued state change into its instance.
    ///
    /// Function changes see the state as merged so far in this cycle.
    pub(crate) fn apply_update(&mut self, update: Update) {
        let Update { change, instance } = update;
        let Some(target) = self.instances.get_mut(&instance) else {
            tracing::debug!(%instance, "dropping update for unmounted component");
            return;
        };
        target.snapshot_state();
        let partial = change.resolve(&target.state, &target.props);
        target.merge_state(partial);
    }

    /// Forget the cycle baseline once a flush has re-rendered `id`.
    pub(crate) fn finish_cycle(&mut self, id: InstanceId) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.prev_state = None;
        }
    }
}

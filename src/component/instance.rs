//! Mounted component instances.

use std::fmt;

use crate::pipeline::Updater;
use crate::types::{merge_state, NodeId, Props, State};

use super::definition::{Component, ComponentDef, Context};

/// Identifier of a mounted component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A component definition brought to life: behaviour plus host-owned data.
pub struct ComponentInstance {
    pub(crate) id: InstanceId,
    pub(crate) def: ComponentDef,
    pub(crate) component: Box<dyn Component>,
    pub(crate) props: Props,
    pub(crate) state: State,
    /// Baseline taken when the first queued update of a flush cycle is applied.
    pub(crate) prev_state: Option<State>,
    /// Live node currently representing this component's output.
    pub(crate) base: Option<NodeId>,
    /// Instance whose render output is directly this component.
    pub(crate) parent: Option<InstanceId>,
    /// Component this instance renders directly as its root.
    pub(crate) child: Option<InstanceId>,
    pub(crate) updater: Updater,
}

impl ComponentInstance {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn def(&self) -> &ComponentDef {
        &self.def
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn base(&self) -> Option<NodeId> {
        self.base
    }

    pub fn updater(&self) -> Updater {
        self.updater.clone()
    }

    /// Render the current props and state.
    pub(crate) fn render(&self) -> crate::vnode::VNode {
        let cx = Context::new(&self.props, &self.state, self.prev_state.as_ref(), &self.updater);
        self.component.render(&cx)
    }

    /// Run a hook with `&mut` access to the behaviour object.
    pub(crate) fn hook(&mut self, f: impl FnOnce(&mut dyn Component, &Context<'_>)) {
        let Self {
            component,
            props,
            state,
            prev_state,
            updater,
            ..
        } = self;
        let cx = Context::new(props, state, prev_state.as_ref(), updater);
        f(component.as_mut(), &cx);
    }

    /// Snapshot the baseline for this flush cycle, once.
    pub(crate) fn snapshot_state(&mut self) {
        if self.prev_state.is_none() {
            self.prev_state = Some(self.state.clone());
        }
    }

    pub(crate) fn merge_state(&mut self, partial: State) {
        merge_state(&mut self.state, partial);
    }
}

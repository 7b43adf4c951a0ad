//! Component definitions and the behaviour trait.

use std::fmt;
use std::rc::Rc;

use crate::pipeline::{StateChange, Updater};
use crate::types::{Props, State};
use crate::vnode::VNode;

// =============================================================================
// Component Trait
// =============================================================================

/// Behaviour of a mounted component.
///
/// Props and state are owned by the host and handed in through [`Context`].
pub trait Component {
    /// State the instance starts with.
    fn initial_state(&self, _props: &Props) -> State {
        State::new()
    }

    /// Describe the UI for the current props and state.
    fn render(&self, cx: &Context<'_>) -> VNode;

    fn component_will_mount(&mut self, _cx: &Context<'_>) {}

    fn component_will_receive_props(&mut self, _next: &Props, _cx: &Context<'_>) {}

    fn component_will_update(&mut self, _cx: &Context<'_>) {}

    fn component_did_mount(&mut self, _cx: &Context<'_>) {}

    fn component_did_update(&mut self, _cx: &Context<'_>) {}
}

/// View of an instance passed to `render` and lifecycle hooks.
pub struct Context<'a> {
    props: &'a Props,
    state: &'a State,
    prev_state: Option<&'a State>,
    updater: &'a Updater,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        props: &'a Props,
        state: &'a State,
        prev_state: Option<&'a State>,
        updater: &'a Updater,
    ) -> Self {
        Self {
            props,
            state,
            prev_state,
            updater,
        }
    }

    pub fn props(&self) -> &Props {
        self.props
    }

    pub fn state(&self) -> &State {
        self.state
    }

    /// State before the updates merged in the current flush, if one is running.
    pub fn prev_state(&self) -> Option<&State> {
        self.prev_state
    }

    /// Queue a state change for this instance.
    pub fn set_state(&self, change: impl Into<StateChange>) {
        self.updater.set_state(change);
    }

    /// Owned handle for queueing state changes later (e.g. from event handlers).
    pub fn updater(&self) -> Updater {
        self.updater.clone()
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// A function-style component: props in, virtual node out.
pub struct FunctionDef {
    name: String,
    render: Box<dyn Fn(&Props) -> VNode>,
}

/// A class-style component: a constructor producing a stateful [`Component`].
pub struct ClassDef {
    name: String,
    construct: Box<dyn Fn(&Props) -> Box<dyn Component>>,
}

/// Component definition, resolved once into one instance shape.
///
/// Two definitions are the same component only if they are the same
/// allocation; clone a definition to reuse it across renders.
#[derive(Clone)]
pub enum ComponentDef {
    Function(Rc<FunctionDef>),
    Class(Rc<ClassDef>),
}

impl ComponentDef {
    /// Stateless definition rendering `props` with `render`.
    pub fn function(name: impl Into<String>, render: impl Fn(&Props) -> VNode + 'static) -> Self {
        ComponentDef::Function(Rc::new(FunctionDef {
            name: name.into(),
            render: Box::new(render),
        }))
    }

    /// Stateful definition; `construct` builds one behaviour per instance.
    pub fn class<C>(name: impl Into<String>, construct: impl Fn(&Props) -> C + 'static) -> Self
    where
        C: Component + 'static,
    {
        ComponentDef::Class(Rc::new(ClassDef {
            name: name.into(),
            construct: Box::new(move |props| Box::new(construct(props)) as Box<dyn Component>),
        }))
    }

    /// Display name used in logs and errors.
    pub fn name(&self) -> &str {
        match self {
            ComponentDef::Function(def) => &def.name,
            ComponentDef::Class(def) => &def.name,
        }
    }

    /// Whether both refer to the same definition.
    pub fn same(&self, other: &ComponentDef) -> bool {
        self.identity() == other.identity()
    }

    /// Address of the definition, used as its identity.
    pub(crate) fn identity(&self) -> usize {
        match self {
            ComponentDef::Function(def) => Rc::as_ptr(def) as *const () as usize,
            ComponentDef::Class(def) => Rc::as_ptr(def) as *const () as usize,
        }
    }

    /// Create the behaviour object for a new instance.
    pub(crate) fn construct(&self, props: &Props) -> Box<dyn Component> {
        match self {
            ComponentDef::Class(def) => (def.construct)(props),
            ComponentDef::Function(def) => Box::new(FunctionComponent { def: def.clone() }),
        }
    }
}

impl PartialEq for ComponentDef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentDef::Function(def) => write!(f, "Function({})", def.name),
            ComponentDef::Class(def) => write!(f, "Class({})", def.name),
        }
    }
}

/// Wrapper giving a function component the instance shape.
struct FunctionComponent {
    def: Rc<FunctionDef>,
}

impl Component for FunctionComponent {
    fn render(&self, cx: &Context<'_>) -> VNode {
        (self.def.render)(cx.props())
    }
}

//! Mount API - Root lifecycle, flush and event dispatch.
//!
//! A [`Root`] owns everything one rendering surface needs: the renderer (and
//! through it the platform), the update scheduler and the event loop that
//! drives flushes.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{h, Props, Root};
//!
//! let root = Root::new();
//! let container = root.create_container("main");
//! root.mount_into(&h("p", Props::new(), ["hello"]), container)?;
//!
//! // Option 1: drain every pending task and microtask
//! root.run_until_idle();
//!
//! // Option 2: tick manually in your own loop
//! while root.tick() {
//!     // Your logic here
//! }
//! ```

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use crate::component::InstanceId;
use crate::config::RenderConfig;
use crate::dom::{Document, Platform};
use crate::error::RenderError;
use crate::renderer::Renderer;
use crate::types::{Event, EventHandler, NodeId, Props, State};
use crate::vnode::VNode;

use super::event_loop::EventLoop;
use super::scheduler::{Scheduler, Updater};

// =============================================================================
// Root
// =============================================================================

struct RootInner<P: Platform> {
    renderer: RefCell<Renderer<P>>,
    scheduler: Rc<Scheduler>,
    event_loop: Rc<EventLoop>,
}

/// One rendering surface. Cheap to clone; clones share the same tree.
pub struct Root<P: Platform + 'static = Document> {
    inner: Rc<RootInner<P>>,
}

impl<P: Platform + 'static> Clone for Root<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Root<Document> {
    /// Root over a fresh in-memory document with default configuration.
    pub fn new() -> Self {
        Self::with_platform(Document::new(), RenderConfig::default())
    }

    /// Root over a fresh in-memory document with `config`.
    pub fn with_config(config: RenderConfig) -> Self {
        Self::with_platform(Document::new(), config)
    }

    /// Create a detached element to mount into.
    pub fn create_container(&self, tag: &str) -> NodeId {
        self.inner.renderer.borrow_mut().platform_mut().create_element(tag)
    }

    /// Markup of the subtree at `node`.
    pub fn markup(&self, node: NodeId) -> String {
        self.inner.renderer.borrow().platform().to_markup(node)
    }
}

impl Default for Root<Document> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform + 'static> Root<P> {
    /// Root over any platform implementation.
    pub fn with_platform(platform: P, config: RenderConfig) -> Self {
        let event_loop = Rc::new(EventLoop::new());
        let scheduler = Rc::new(Scheduler::new(event_loop.clone()));

        let inner = Rc::new_cyclic(|weak: &Weak<RootInner<P>>| {
            let weak = weak.clone();
            scheduler.init(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                match inner.flush() {
                    Ok(()) => {}
                    Err(RenderError::Reentrant) => {
                        tracing::warn!("renderer busy during flush; retrying as a task");
                        inner.scheduler.defer_flush();
                    }
                    Err(err) => tracing::error!(%err, "flush failed"),
                }
            });
            RootInner {
                renderer: RefCell::new(Renderer::new(platform, config, Rc::downgrade(&scheduler))),
                scheduler: scheduler.clone(),
                event_loop,
            }
        });

        tracing::debug!("root created");
        Self { inner }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render `vnode` as the only content of `container`.
    pub fn mount_into(&self, vnode: &VNode, container: NodeId) -> Result<NodeId, RenderError> {
        let mut renderer = self
            .inner
            .renderer
            .try_borrow_mut()
            .map_err(|_| RenderError::Reentrant)?;
        renderer.mount_into(vnode, container)
    }

    /// Patch the live subtree at `live` to match `vnode`.
    pub fn reconcile(&self, live: NodeId, vnode: &VNode) -> Result<NodeId, RenderError> {
        let mut renderer = self
            .inner
            .renderer
            .try_borrow_mut()
            .map_err(|_| RenderError::Reentrant)?;
        renderer.reconcile(Some(live), vnode, None)
    }

    /// Apply every queued state change now and re-render the dirty components.
    pub fn flush(&self) -> Result<(), RenderError> {
        self.inner.flush()
    }

    // =========================================================================
    // Event Loop
    // =========================================================================

    /// Run one task and every microtask after it.
    ///
    /// Returns whether work remains. Returns `false` without running anything
    /// when called from inside a render.
    pub fn tick(&self) -> bool {
        if self.inner.renderer.try_borrow_mut().is_err() {
            tracing::warn!("tick requested during render; ignored");
            return false;
        }
        self.inner.event_loop.tick()
    }

    /// Tick until no task or microtask is pending.
    pub fn run_until_idle(&self) {
        while self.tick() {}
    }

    /// Post a task to run on a later tick.
    pub fn post_task(&self, task: impl FnOnce() + 'static) {
        self.inner.event_loop.post_task(task);
    }

    /// Fire an event at `target`, bubbling through its ancestors.
    ///
    /// Handlers run outside the renderer borrow, so they may queue state
    /// changes. Microtasks queued by the handlers run before this returns.
    /// Returns how many handlers were called.
    pub fn dispatch(&self, target: NodeId, kind: &str) -> Result<usize, RenderError> {
        let handlers = self.bubble_path(target, kind)?;
        tracing::debug!(%target, kind, handlers = handlers.len(), "dispatch");

        for (current_target, handler) in &handlers {
            handler(&Event {
                kind: kind.to_string(),
                target,
                current_target: *current_target,
            });
        }
        self.inner.event_loop.run_microtasks();
        Ok(handlers.len())
    }

    fn bubble_path(
        &self,
        target: NodeId,
        kind: &str,
    ) -> Result<Vec<(NodeId, EventHandler)>, RenderError> {
        let renderer = self
            .inner
            .renderer
            .try_borrow()
            .map_err(|_| RenderError::Reentrant)?;
        let platform = renderer.platform();
        let name = renderer.config().listener_name(kind);

        let mut handlers = Vec::new();
        let mut node = Some(target);
        while let Some(current) = node {
            if let Some(handler) = platform.listener(current, &name)? {
                handlers.push((current, handler));
            }
            node = platform.parent(current)?;
        }
        Ok(handlers)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Borrow the renderer for inspection.
    pub fn renderer(&self) -> Ref<'_, Renderer<P>> {
        self.inner.renderer.borrow()
    }

    /// Run `f` against the live tree.
    pub fn with_platform_ref<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(self.inner.renderer.borrow().platform())
    }

    /// Run `f` against the live tree mutably, bypassing reconciliation.
    pub fn with_platform_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(self.inner.renderer.borrow_mut().platform_mut())
    }

    /// Outermost component whose output root is `node`.
    pub fn owner_of(&self, node: NodeId) -> Option<InstanceId> {
        self.inner.renderer.borrow().owner_of(node)
    }

    /// Whether instance `id` is still mounted.
    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.inner.renderer.borrow().is_mounted(id)
    }

    /// Snapshot of the committed state of `id`.
    pub fn state_of(&self, id: InstanceId) -> Option<State> {
        let renderer = self.inner.renderer.borrow();
        renderer.instance(id).map(|instance| instance.state().clone())
    }

    /// Snapshot of the current props of `id`.
    pub fn props_of(&self, id: InstanceId) -> Option<Props> {
        let renderer = self.inner.renderer.borrow();
        renderer.instance(id).map(|instance| instance.props().clone())
    }

    /// Root live node of the output of `id`.
    pub fn base_of(&self, id: InstanceId) -> Option<NodeId> {
        let renderer = self.inner.renderer.borrow();
        renderer.instance(id).and_then(|instance| instance.base())
    }

    /// Handle for queueing state changes on `id`.
    pub fn updater_of(&self, id: InstanceId) -> Option<Updater> {
        let renderer = self.inner.renderer.borrow();
        renderer.instance(id).map(|instance| instance.updater())
    }

    /// Update scheduler shared by every component of this root.
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Event loop that runs this root's flushes.
    pub fn event_loop(&self) -> &EventLoop {
        &self.inner.event_loop
    }
}

// =============================================================================
// Flush
// =============================================================================

impl<P: Platform> RootInner<P> {
    /// Merge every queued update, then render each dirty instance once.
    ///
    /// A failing instance does not stop the others; the first error is returned.
    fn flush(&self) -> Result<(), RenderError> {
        let mut renderer = self
            .renderer
            .try_borrow_mut()
            .map_err(|_| RenderError::Reentrant)?;

        let updates = self.scheduler.take_updates();
        let merged = updates.len();
        for update in updates {
            renderer.apply_update(update);
        }

        let dirty = self.scheduler.take_dirty();
        tracing::debug!(updates = merged, components = dirty.len(), "flush");

        let mut first_error = None;
        for id in dirty {
            let unrendered = match renderer.instance(id) {
                None => continue,
                Some(instance) if instance.base().is_none() => {
                    Some(instance.def().name().to_string())
                }
                Some(_) => None,
            };
            let result = match unrendered {
                Some(name) => Err(RenderError::MissingBase(name)),
                None => renderer.render_and_commit(id).map(|_| ()),
            };
            renderer.finish_cycle(id);
            if let Err(err) = result {
                tracing::error!(%id, %err, "re-render failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

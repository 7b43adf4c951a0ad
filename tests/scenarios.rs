//! End-to-end rendering scenarios through the public `Root` API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;
use spark_vdom::{
    h, Component, ComponentDef, ComponentNode, Context, Mutations, NodeId, Platform, PropValue,
    Props, RenderConfig, Root, State, StateChange, Style, VNode,
};

fn count_of(state: &State) -> i64 {
    state.get("count").and_then(|v| v.as_i64()).unwrap_or(0)
}

fn increment() -> StateChange {
    StateChange::compute(|state, _props| {
        json!({"count": count_of(state) + 1})
            .as_object()
            .cloned()
            .unwrap_or_default()
    })
}

fn children(root: &Root, node: NodeId) -> Vec<NodeId> {
    root.with_platform_ref(|doc| doc.children(node)).unwrap()
}

// =============================================================================
// Mounting
// =============================================================================

#[test]
fn mounts_element_with_class_and_text() {
    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(&h("div", Props::new().with("className", "x"), ["hi"]), container)
        .unwrap();

    assert_eq!(root.markup(node), r#"<div class="x">hi</div>"#);
    assert_eq!(children(&root, container), vec![node]);
}

#[test]
fn mounting_again_replaces_container_content() {
    let root = Root::new();
    let container = root.create_container("body");
    let first = root.mount_into(&VNode::text("one"), container).unwrap();
    let second = root.mount_into(&VNode::text("two"), container).unwrap();

    assert_eq!(children(&root, container), vec![second]);
    assert!(!root.with_platform_ref(|doc| doc.is_alive(first)));
}

// =============================================================================
// Batched State
// =============================================================================

struct Counter {
    renders: Rc<Cell<usize>>,
    updates: Rc<Cell<usize>>,
}

impl Component for Counter {
    fn initial_state(&self, _props: &Props) -> State {
        json!({"count": 0}).as_object().cloned().unwrap_or_default()
    }

    fn render(&self, cx: &Context<'_>) -> VNode {
        self.renders.set(self.renders.get() + 1);
        let updater = cx.updater();
        let on_click = PropValue::handler(move |_| {
            updater.set_state(increment());
            updater.set_state(increment());
        });
        h(
            "button",
            Props::new().with("onClick", on_click),
            [format!("count: {}", count_of(cx.state()))],
        )
    }

    fn component_did_update(&mut self, _cx: &Context<'_>) {
        self.updates.set(self.updates.get() + 1);
    }
}

#[test]
fn two_increments_in_one_click_commit_once() {
    let renders = Rc::new(Cell::new(0));
    let updates = Rc::new(Cell::new(0));
    let (r, u) = (renders.clone(), updates.clone());
    let def = ComponentDef::class("Counter", move |_| Counter {
        renders: r.clone(),
        updates: u.clone(),
    });

    let root = Root::new();
    let container = root.create_container("body");
    let button = root
        .mount_into(&ComponentNode::new(def, Props::new()).into(), container)
        .unwrap();
    assert_eq!(root.markup(button), "<button>count: 0</button>");
    assert_eq!(renders.get(), 1);

    assert_eq!(root.dispatch(button, "click").unwrap(), 1);
    root.run_until_idle();

    assert_eq!(root.markup(button), "<button>count: 2</button>");
    assert_eq!(renders.get(), 2);
    assert_eq!(updates.get(), 1);
}

#[test]
fn merged_changes_render_once() {
    let renders = Rc::new(Cell::new(0));
    let seen = renders.clone();
    let def = ComponentDef::class("Plain", move |_| Counter {
        renders: seen.clone(),
        updates: Rc::default(),
    });

    let root = Root::new();
    let container = root.create_container("body");
    let base = root
        .mount_into(&ComponentNode::new(def, Props::new()).into(), container)
        .unwrap();
    let id = root.owner_of(base).unwrap();
    let updater = root.updater_of(id).unwrap();

    updater.set_state(json!({"a": 1}));
    updater.set_state(json!({"b": 2}));
    assert_eq!(root.scheduler().pending_updates(), 2);
    root.run_until_idle();

    let state = root.state_of(id).unwrap();
    assert_eq!(state["a"], json!(1));
    assert_eq!(state["b"], json!(2));
    assert_eq!(state["count"], json!(0));
    assert_eq!(renders.get(), 2);
}

struct Echo {
    log: Rc<RefCell<Vec<String>>>,
}

impl Component for Echo {
    fn render(&self, cx: &Context<'_>) -> VNode {
        self.log.borrow_mut().push("render".into());
        h("i", Props::new(), [count_of(cx.state()).to_string()])
    }

    fn component_did_mount(&mut self, cx: &Context<'_>) {
        self.log.borrow_mut().push("did_mount".into());
        cx.set_state(increment());
    }

    fn component_will_update(&mut self, _cx: &Context<'_>) {
        self.log.borrow_mut().push("will_update".into());
    }

    fn component_did_update(&mut self, cx: &Context<'_>) {
        let before = cx.prev_state().map(count_of);
        self.log
            .borrow_mut()
            .push(format!("did_update {:?} -> {}", before, count_of(cx.state())));
    }
}

#[test]
fn set_state_in_did_mount_renders_after_tick() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let captured = log.clone();
    let def = ComponentDef::class("Echo", move |_| Echo { log: captured.clone() });

    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(&ComponentNode::new(def, Props::new()).into(), container)
        .unwrap();
    assert_eq!(root.markup(node), "<i>0</i>");

    root.run_until_idle();
    assert_eq!(root.markup(node), "<i>1</i>");
    assert_eq!(
        *log.borrow(),
        ["render", "did_mount", "render", "will_update", "did_update Some(0) -> 1"]
    );
}

struct Chain {
    renders: Rc<Cell<usize>>,
}

impl Component for Chain {
    fn render(&self, cx: &Context<'_>) -> VNode {
        self.renders.set(self.renders.get() + 1);
        h("p", Props::new(), [count_of(cx.state()).to_string()])
    }

    fn component_did_update(&mut self, cx: &Context<'_>) {
        if count_of(cx.state()) < 3 {
            cx.set_state(increment());
        }
    }
}

#[test]
fn set_state_during_flush_waits_for_next_cycle() {
    let renders = Rc::new(Cell::new(0));
    let seen = renders.clone();
    let def = ComponentDef::class("Chain", move |_| Chain { renders: seen.clone() });

    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(&ComponentNode::new(def, Props::new()).into(), container)
        .unwrap();
    let id = root.owner_of(node).unwrap();
    root.updater_of(id).unwrap().set_state(increment());

    root.flush().unwrap();
    assert_eq!(root.markup(node), "<p>1</p>");
    assert_eq!(renders.get(), 2);
    assert_eq!(root.scheduler().pending_updates(), 1);

    root.run_until_idle();
    assert_eq!(root.markup(node), "<p>3</p>");
    assert_eq!(renders.get(), 4);
}

#[test]
fn busy_renderer_defers_flush_to_a_task() {
    let renders = Rc::new(Cell::new(0));
    let seen = renders.clone();
    let def = ComponentDef::class("Chain", move |_| Chain { renders: seen.clone() });

    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(&ComponentNode::new(def, Props::new()).into(), container)
        .unwrap();
    let id = root.owner_of(node).unwrap();
    root.updater_of(id).unwrap().set_state(json!({"count": 3}));

    {
        let _busy = root.renderer();
        assert!(!root.tick());
        root.event_loop().run_microtasks();
        assert_eq!(root.scheduler().pending_updates(), 1);
        assert!(root.event_loop().has_pending());
    }
    assert_eq!(renders.get(), 1);

    root.run_until_idle();
    assert_eq!(root.markup(node), "<p>3</p>");
    assert_eq!(renders.get(), 2);
    assert_eq!(root.scheduler().pending_updates(), 0);
}

type Log = Rc<RefCell<Vec<String>>>;

struct Tally {
    name: String,
    log: Log,
}

impl Component for Tally {
    fn render(&self, cx: &Context<'_>) -> VNode {
        self.log.borrow_mut().push(format!("render {}", self.name));
        h("p", Props::new(), [format!("{} {}", self.name, count_of(cx.state()))])
    }
}

fn logged_increment(log: &Log, name: &'static str) -> StateChange {
    let log = log.clone();
    StateChange::compute(move |state, _props| {
        log.borrow_mut().push(format!("merge {name}"));
        json!({"count": count_of(state) + 1})
            .as_object()
            .cloned()
            .unwrap_or_default()
    })
}

#[test]
fn every_update_merges_before_any_render() {
    let log: Log = Rc::default();
    let captured = log.clone();
    let def = ComponentDef::class("Tally", move |props| Tally {
        name: props.get_str("name").unwrap_or("").to_string(),
        log: captured.clone(),
    });
    let tally = |name: &str| {
        VNode::from(ComponentNode::new(def.clone(), Props::new().with("name", name)))
    };

    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(&h("div", Props::new(), [tally("a"), tally("b")]), container)
        .unwrap();
    let ids: Vec<_> = children(&root, node)
        .into_iter()
        .map(|child| root.owner_of(child).unwrap())
        .collect();
    let (a, b) = (root.updater_of(ids[0]).unwrap(), root.updater_of(ids[1]).unwrap());
    log.borrow_mut().clear();

    a.set_state(logged_increment(&log, "a"));
    b.set_state(logged_increment(&log, "b"));
    a.set_state(logged_increment(&log, "a"));
    root.run_until_idle();

    assert_eq!(
        *log.borrow(),
        ["merge a", "merge b", "merge a", "render a", "render b"]
    );
    assert_eq!(root.markup(node), "<div><p>a 2</p><p>b 1</p></div>");
}

// =============================================================================
// Reconciliation
// =============================================================================

#[test]
fn identical_text_is_not_rewritten() {
    let root = Root::new();
    let container = root.create_container("body");
    let node = root.mount_into(&h("p", Props::new(), ["same"]), container).unwrap();
    let text = children(&root, node)[0];
    root.with_platform_mut(|doc| doc.clear_mutations());

    let out = root.reconcile(node, &h("p", Props::new(), ["same"])).unwrap();
    assert_eq!(out, node);
    assert_eq!(children(&root, node), vec![text]);
    let flags = root.with_platform_ref(|doc| doc.mutations(text));
    assert!(!flags.contains(Mutations::TEXT));
}

#[test]
fn tag_change_relocates_children() {
    let root = Root::new();
    let container = root.create_container("body");
    let vnode = |tag: &str| {
        h(
            tag,
            Props::new().with("id", "box"),
            [h("b", Props::new(), ["1"]), h("b", Props::new(), ["2"])],
        )
    };
    let node = root.mount_into(&vnode("div"), container).unwrap();
    let kids = children(&root, node);

    let out = root.reconcile(node, &vnode("section")).unwrap();
    assert_ne!(out, node);
    assert_eq!(children(&root, out), kids);
    assert_eq!(children(&root, container), vec![out]);
    assert_eq!(
        root.markup(out),
        r#"<section id="box"><b>1</b><b>2</b></section>"#
    );
}

#[test]
fn unkeyed_children_are_reused_by_type() {
    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(
            &h(
                "div",
                Props::new(),
                [h("span", Props::new(), ["a"]), h("span", Props::new(), ["b"])],
            ),
            container,
        )
        .unwrap();
    let before = children(&root, node);

    root.reconcile(
        node,
        &h(
            "div",
            Props::new(),
            [
                h("span", Props::new(), ["x"]),
                h("span", Props::new(), ["y"]),
                h("span", Props::new(), ["z"]),
            ],
        ),
    )
    .unwrap();

    let after = children(&root, node);
    assert_eq!(&after[..2], &before[..]);
    assert_eq!(root.markup(node), "<div><span>x</span><span>y</span><span>z</span></div>");
}

#[test]
fn identical_props_cause_no_attribute_writes() {
    let handler = PropValue::handler(|_| {});
    let props = Props::new()
        .with("className", "card")
        .with("title", "t")
        .with("data-n", 0)
        .with("style", Style::map([("width", 10)]))
        .with("onClick", handler);

    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(&h("div", props.clone(), Vec::<VNode>::new()), container)
        .unwrap();
    root.with_platform_mut(|doc| doc.clear_mutations());

    root.reconcile(node, &h("div", props, Vec::<VNode>::new())).unwrap();
    let flags = root.with_platform_ref(|doc| doc.mutations(node));
    assert!(!flags.has_sync_writes(), "unexpected writes: {flags:?}");
}

#[test]
fn clear_stale_styles_when_configured() {
    let root = Root::with_config(RenderConfig::default().with_clear_stale_styles(true));
    let container = root.create_container("body");
    let node = root
        .mount_into(
            &h(
                "div",
                Props::new().with("style", Style::map([("width", 1), ("height", 2)])),
                Vec::<VNode>::new(),
            ),
            container,
        )
        .unwrap();

    root.reconcile(
        node,
        &h("div", Props::new().with("style", Style::map([("width", 1)])), Vec::<VNode>::new()),
    )
    .unwrap();
    assert_eq!(root.markup(node), r#"<div style="width: 1px"></div>"#);
}

// =============================================================================
// Components
// =============================================================================

#[test]
fn component_type_change_replaces_in_place() {
    let first = ComponentDef::function("First", |_| h("p", Props::new(), ["first"]));
    let second = ComponentDef::function("Second", |_| h("p", Props::new(), ["second"]));

    let root = Root::new();
    let container = root.create_container("body");
    let list = |def: &ComponentDef| {
        h(
            "div",
            Props::new(),
            [
                h("hr", Props::new(), Vec::<VNode>::new()),
                ComponentNode::new(def.clone(), Props::new()).into(),
                h("hr", Props::new(), Vec::<VNode>::new()),
            ],
        )
    };
    let node = root.mount_into(&list(&first), container).unwrap();
    let old = children(&root, node)[1];
    let old_owner = root.owner_of(old).unwrap();

    root.reconcile(node, &list(&second)).unwrap();
    let new = children(&root, node)[1];
    assert_ne!(new, old);
    assert!(!root.is_mounted(old_owner));
    assert!(root.owner_of(new).is_some());
    assert_eq!(root.markup(node), "<div><hr></hr><p>second</p><hr></hr></div>");
}

#[test]
fn keyed_components_follow_their_keys() {
    let item = ComponentDef::function("Item", |props| {
        h("li", Props::new(), [props.get_str("label").unwrap_or("").to_string()])
    });
    let list = |labels: &[&str]| {
        h(
            "ul",
            Props::new(),
            labels
                .iter()
                .map(|l| {
                    let props = Props::new().with("key", *l).with("label", *l);
                    VNode::from(ComponentNode::new(item.clone(), props))
                })
                .collect::<Vec<_>>(),
        )
    };

    let root = Root::new();
    let container = root.create_container("body");
    let node = root.mount_into(&list(&["a", "b", "c"]), container).unwrap();
    let before = children(&root, node);
    let owners: Vec<_> = before.iter().map(|n| root.owner_of(*n)).collect();

    root.reconcile(node, &list(&["c", "a", "b"])).unwrap();
    let after = children(&root, node);
    assert_eq!(after, vec![before[2], before[0], before[1]]);
    assert_eq!(root.owner_of(after[0]), owners[2]);
    assert_eq!(root.markup(node), "<ul><li>c</li><li>a</li><li>b</li></ul>");
}

struct Row;

impl Component for Row {
    fn initial_state(&self, _props: &Props) -> State {
        json!({"n": 0}).as_object().cloned().unwrap_or_default()
    }

    fn render(&self, cx: &Context<'_>) -> VNode {
        let n = cx.state().get("n").and_then(|v| v.as_i64()).unwrap_or(0);
        h("li", Props::new().with("key", "inner"), [format!("n={n}")])
    }
}

#[test]
fn stateful_child_with_keyed_root_survives_parent_render() {
    let def = ComponentDef::class("Row", |_| Row);
    for outer_key in [None, Some("outer")] {
        let list = || {
            let mut props = Props::new();
            if let Some(key) = outer_key {
                props.insert("key", key);
            }
            h("ul", Props::new(), [VNode::from(ComponentNode::new(def.clone(), props))])
        };

        let root = Root::new();
        let container = root.create_container("body");
        let ul = root.mount_into(&list(), container).unwrap();
        let base = children(&root, ul)[0];
        let id = root.owner_of(base).unwrap();
        let key = root.with_platform_ref(|doc| doc.key(base).unwrap().map(str::to_owned));
        assert_eq!(key.as_deref(), outer_key);

        root.updater_of(id).unwrap().set_state(json!({"n": 5}));
        root.run_until_idle();
        assert_eq!(root.markup(ul), "<ul><li>n=5</li></ul>");

        root.reconcile(ul, &list()).unwrap();
        assert!(root.is_mounted(id), "outer key {outer_key:?}");
        assert_eq!(children(&root, ul), vec![base]);
        assert_eq!(root.owner_of(base), Some(id));
        assert_eq!(root.markup(ul), "<ul><li>n=5</li></ul>");
    }
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn dispatch_reaches_bound_handler_once_rebound() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let handler = |tag: &'static str| {
        let hits = hits.clone();
        PropValue::handler(move |event| {
            hits.borrow_mut().push((tag, event.kind.clone(), event.target == event.current_target));
        })
    };

    let root = Root::new();
    let container = root.create_container("body");
    let node = root
        .mount_into(&h("a", Props::new().with("onClick", handler("first")), ["go"]), container)
        .unwrap();
    root.reconcile(node, &h("a", Props::new().with("onClick", handler("second")), ["go"]))
        .unwrap();

    assert_eq!(root.dispatch(node, "click").unwrap(), 1);
    assert_eq!(*hits.borrow(), vec![("second", "click".to_string(), true)]);

    root.reconcile(node, &h("a", Props::new(), ["go"])).unwrap();
    assert_eq!(root.dispatch(node, "click").unwrap(), 0);
}

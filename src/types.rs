//! Core types shared by every layer.
//!
//! - [`NodeId`] - handle to a live platform node
//! - [`PropValue`] / [`Props`] - element and component properties
//! - [`Style`] / [`StyleValue`] - inline style descriptions
//! - [`State`] - component state mapping
//! - [`Event`] / [`EventHandler`] - native event callbacks

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

// =============================================================================
// Live Node Handle
// =============================================================================

/// Handle to a live node owned by a [`Platform`](crate::dom::Platform).
///
/// The generation guards against a released slot being reused while an old
/// handle is still held somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot of this node.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Events
// =============================================================================

/// A native event delivered to a bound handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event kind without the handler prefix (e.g. "click").
    pub kind: String,
    /// Node the event was dispatched on.
    pub target: NodeId,
    /// Node whose handler is currently running (differs from `target` while bubbling).
    pub current_target: NodeId,
}

/// Event callback (Rc so the same handler can be bound, compared and cloned).
pub type EventHandler = Rc<dyn Fn(&Event)>;

// =============================================================================
// State
// =============================================================================

/// Component state: a mapping from key to JSON value.
pub type State = serde_json::Map<String, Value>;

/// Shallow-merge `partial` into `state` (later keys win).
pub fn merge_state(state: &mut State, partial: State) {
    for (key, value) in partial {
        state.insert(key, value);
    }
}

// =============================================================================
// Styles
// =============================================================================

/// A single inline style value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// Numeric length, written with the configured unit appended.
    Length(f64),
    /// Written verbatim.
    Raw(String),
}

impl StyleValue {
    /// Render as style text, appending `unit` to lengths.
    pub fn to_css(&self, unit: &str) -> String {
        match self {
            StyleValue::Length(n) => format!("{}{}", format_number(*n), unit),
            StyleValue::Raw(s) => s.clone(),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Length(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Length(f64::from(value))
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Raw(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Raw(value)
    }
}

/// Inline style prop.
#[derive(Debug, Clone, PartialEq)]
pub enum Style {
    /// Raw style text, replaces every inline style on write.
    Text(String),
    /// Individual properties, written one by one.
    Map(BTreeMap<String, StyleValue>),
}

impl Style {
    /// Build a mapping style from `(property, value)` pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<StyleValue>,
    {
        Style::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parse `"color: red; width: 10px"` into a property map.
///
/// Empty declarations and declarations without a colon are skipped.
pub fn parse_style_text(text: &str) -> BTreeMap<String, String> {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Serialize a property map back into style text.
pub fn style_text(map: &BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Format a number the way attribute text expects (`10`, not `10.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A property value on an element or component.
#[derive(Clone, Default)]
pub enum PropValue {
    /// Absent. Erases the attribute it is applied to.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Style(Style),
    Handler(EventHandler),
}

impl PropValue {
    /// Wrap a closure as an event handler value.
    pub fn handler(f: impl Fn(&Event) + 'static) -> Self {
        PropValue::Handler(Rc::new(f))
    }

    /// Whether the value counts as "present" for attribute writes.
    ///
    /// Null, `false` and the empty string are absent. Zero is present.
    pub fn is_present(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(b) => *b,
            PropValue::Text(s) => !s.is_empty(),
            PropValue::Number(_) | PropValue::Style(_) | PropValue::Handler(_) => true,
        }
    }

    /// Attribute text for this value, or None when the attribute should be removed.
    pub fn to_attribute(&self) -> Option<String> {
        if !self.is_present() {
            return None;
        }
        match self {
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Number(n) => Some(format_number(*n)),
            PropValue::Text(s) => Some(s.clone()),
            PropValue::Style(Style::Text(s)) => Some(s.clone()),
            PropValue::Style(Style::Map(map)) => Some(
                map.iter()
                    .map(|(k, v)| format!("{k}: {}", v.to_css("")))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            PropValue::Null | PropValue::Handler(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => a == b,
            (PropValue::Text(a), PropValue::Text(b)) => a == b,
            (PropValue::Style(a), PropValue::Style(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("Null"),
            PropValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            PropValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            PropValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            PropValue::Style(s) => f.debug_tuple("Style").field(s).finish(),
            PropValue::Handler(h) => write!(f, "Handler({:p})", Rc::as_ptr(h)),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(f64::from(value))
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropValue::Null, Into::into)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Name of the reserved identity prop.
pub const KEY_PROP: &str = "key";

/// Property mapping for an element or component. Keys are unique, order is irrelevant.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert or overwrite one prop.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of prop `name`.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    /// Prop `name` as text, if it is text.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    /// Prop `name` as a number, if it is a number.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropValue::as_f64)
    }

    /// Whether prop `name` is set, whatever its value.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Props in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of props.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no prop is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identity key from the `key` prop (text or number).
    pub fn key(&self) -> Option<String> {
        match self.get(KEY_PROP)? {
            PropValue::Text(s) if !s.is_empty() => Some(s.clone()),
            PropValue::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Tests
// =============================================================================

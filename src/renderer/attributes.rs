//! Attribute synchronizer - apply one prop to one live element.
//!
//! A prop name falls into exactly one bucket:
//!
//! ```text
//! on*      → listener (lower-cased name), handler or nothing
//! style    → inline style, text or per-property mapping
//! anything → native property (when the node has one) + attribute text
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::RenderConfig;
use crate::dom::Platform;
use crate::error::DomError;
use crate::types::{parse_style_text, NodeId, PropValue, Style, StyleValue};

/// Write `value` for prop `name` onto `node`.
///
/// Absent values (null, `false`, empty text) erase whatever the prop wrote
/// before: the listener is unbound, the inline style cleared, the attribute
/// removed.
pub fn apply_attribute<P: Platform + ?Sized>(
    platform: &mut P,
    config: &RenderConfig,
    node: NodeId,
    name: &str,
    value: &PropValue,
) -> Result<(), DomError> {
    tracing::trace!(%node, name, ?value, "apply attribute");

    if config.is_event(name) {
        let event = name.to_ascii_lowercase();
        let handler = match value {
            PropValue::Handler(handler) => Some(handler.clone()),
            other => {
                if other.is_present() {
                    tracing::warn!(%node, name, ?other, "event prop is not a handler; unbinding");
                }
                None
            }
        };
        return platform.set_listener(node, &event, handler);
    }

    if name == "style" {
        return apply_style(platform, config, node, value);
    }

    let name = config.attribute_name(name);
    if platform.has_property(node, &name) {
        platform.set_property(node, &name, value)?;
    }
    match value.to_attribute() {
        Some(text) => platform.set_attribute(node, &name, &text),
        None => platform.remove_attribute(node, &name),
    }
}

fn apply_style<P: Platform + ?Sized>(
    platform: &mut P,
    config: &RenderConfig,
    node: NodeId,
    value: &PropValue,
) -> Result<(), DomError> {
    match value {
        PropValue::Style(Style::Map(map)) => {
            if config.clear_stale_styles {
                let stale: Vec<String> = platform
                    .style(node)?
                    .into_keys()
                    .filter(|name| !map.contains_key(name))
                    .collect();
                for name in stale {
                    platform.remove_style_property(node, &name)?;
                }
            }
            for (name, value) in map {
                platform.set_style_property(node, name, &value.to_css(&config.length_unit))?;
            }
            Ok(())
        }
        PropValue::Style(Style::Text(text)) | PropValue::Text(text) => {
            platform.set_style_text(node, text)
        }
        other => platform.set_style_text(node, &other.to_attribute().unwrap_or_default()),
    }
}

// =============================================================================
// Live Snapshot
// =============================================================================

/// Everything a previous render wrote onto `node`, keyed by normalized name.
///
/// Attributes come back as text, the inline style as one mapping under
/// `style`, listeners as handlers.
pub(crate) fn live_props<P: Platform + ?Sized>(
    platform: &P,
    node: NodeId,
) -> Result<BTreeMap<String, PropValue>, DomError> {
    let mut live: BTreeMap<String, PropValue> = platform
        .attributes(node)?
        .into_iter()
        .map(|(name, value)| (name, PropValue::Text(value)))
        .collect();

    let style = platform.style(node)?;
    if !style.is_empty() {
        let map = style
            .into_iter()
            .map(|(name, value)| (name, StyleValue::Raw(value)))
            .collect();
        live.insert("style".to_string(), PropValue::Style(Style::Map(map)));
    }

    for (name, handler) in platform.listeners(node)? {
        live.insert(name, PropValue::Handler(handler));
    }
    Ok(live)
}

/// Whether writing `next` would leave the live value `current` unchanged.
pub(crate) fn is_applied(current: &PropValue, next: &PropValue, config: &RenderConfig) -> bool {
    match (current, next) {
        (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
        (PropValue::Handler(_), _) | (_, PropValue::Handler(_)) => false,
        (PropValue::Style(Style::Map(live)), next) => style_applied(live, next, config),
        (current, next) => current.to_attribute() == next.to_attribute(),
    }
}

/// Whether writing `next` for prop `name` onto a node with no live entry for
/// it would leave nothing behind.
///
/// Covers plain absent values, non-handler values on event props and style
/// values that name no non-empty property.
pub(crate) fn leaves_nothing(name: &str, next: &PropValue, config: &RenderConfig) -> bool {
    if config.is_event(name) {
        return next.as_handler().is_none();
    }
    if name == "style" {
        return match next {
            PropValue::Style(Style::Map(map)) => map
                .values()
                .all(|value| value.to_css(&config.length_unit).is_empty()),
            PropValue::Style(Style::Text(text)) | PropValue::Text(text) => {
                parse_style_text(text).is_empty()
            }
            other => other
                .to_attribute()
                .is_none_or(|text| parse_style_text(&text).is_empty()),
        };
    }
    !next.is_present()
}

fn style_applied(
    live: &BTreeMap<String, StyleValue>,
    next: &PropValue,
    config: &RenderConfig,
) -> bool {
    let live_css = |name: &str| live.get(name).map(|value| value.to_css(""));
    match next {
        PropValue::Style(Style::Map(map)) => {
            let written = map.iter().all(|(name, value)| {
                let css = value.to_css(&config.length_unit);
                if css.is_empty() {
                    !live.contains_key(name)
                } else {
                    live_css(name).as_deref() == Some(css.as_str())
                }
            });
            let no_stale = !config.clear_stale_styles
                || live.keys().all(|name| map.contains_key(name));
            written && no_stale
        }
        PropValue::Style(Style::Text(text)) | PropValue::Text(text) => {
            let parsed = parse_style_text(text);
            parsed.len() == live.len()
                && parsed
                    .iter()
                    .all(|(name, value)| live_css(name).as_deref() == Some(value.as_str()))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn element() -> (Document, NodeId) {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        (doc, node)
    }

    #[test]
    fn test_class_name_becomes_class() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        apply_attribute(&mut doc, &config, node, "className", &"x".into()).unwrap();
        assert_eq!(doc.attribute(node, "class"), Some("x"));
        assert_eq!(doc.attribute(node, "className"), None);
    }

    #[test]
    fn test_absent_value_removes_attribute() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        apply_attribute(&mut doc, &config, node, "title", &"hello".into()).unwrap();
        assert_eq!(doc.attribute(node, "title"), Some("hello"));
        assert_eq!(doc.property(node, "title"), Some(&PropValue::from("hello")));

        apply_attribute(&mut doc, &config, node, "title", &PropValue::Bool(false)).unwrap();
        assert_eq!(doc.attribute(node, "title"), None);
    }

    #[test]
    fn test_zero_is_written() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        apply_attribute(&mut doc, &config, node, "data-count", &0.into()).unwrap();
        assert_eq!(doc.attribute(node, "data-count"), Some("0"));
    }

    #[test]
    fn test_style_mapping_appends_unit() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        let style = Style::map([("width", StyleValue::from(10)), ("color", "red".into())]);
        apply_attribute(&mut doc, &config, node, "style", &style.into()).unwrap();
        assert_eq!(doc.style_property(node, "width"), Some("10px"));
        assert_eq!(doc.style_property(node, "color"), Some("red"));
    }

    #[test]
    fn test_style_mapping_keeps_unnamed_properties() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        apply_attribute(&mut doc, &config, node, "style", &"color: red; margin: 0".into()).unwrap();
        apply_attribute(&mut doc, &config, node, "style", &Style::map([("width", 4)]).into())
            .unwrap();
        assert_eq!(doc.style_property(node, "color"), Some("red"));
        assert_eq!(doc.style_property(node, "width"), Some("4px"));
    }

    #[test]
    fn test_style_mapping_clears_stale_when_configured() {
        let (mut doc, node) = element();
        let config = RenderConfig::default().with_clear_stale_styles(true);
        apply_attribute(&mut doc, &config, node, "style", &"color: red".into()).unwrap();
        apply_attribute(&mut doc, &config, node, "style", &Style::map([("width", 4)]).into())
            .unwrap();
        assert_eq!(doc.style_property(node, "color"), None);
        assert_eq!(doc.style_property(node, "width"), Some("4px"));
    }

    #[test]
    fn test_style_text_replaces_everything() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        apply_attribute(&mut doc, &config, node, "style", &Style::map([("width", 4)]).into())
            .unwrap();
        apply_attribute(&mut doc, &config, node, "style", &"color: blue".into()).unwrap();
        assert_eq!(doc.style_property(node, "width"), None);
        assert_eq!(doc.style_property(node, "color"), Some("blue"));

        apply_attribute(&mut doc, &config, node, "style", &PropValue::Null).unwrap();
        assert!(doc.style(node).unwrap().is_empty());
    }

    #[test]
    fn test_event_prop_binds_lowercase_listener() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        let handler = PropValue::handler(|_| {});
        apply_attribute(&mut doc, &config, node, "onClick", &handler).unwrap();
        assert!(doc.listener(node, "onclick").unwrap().is_some());
        assert_eq!(doc.attribute(node, "onClick"), None);

        apply_attribute(&mut doc, &config, node, "onClick", &PropValue::Null).unwrap();
        assert!(doc.listener(node, "onclick").unwrap().is_none());
    }

    #[test]
    fn test_custom_event_prefix() {
        let (mut doc, node) = element();
        let config = RenderConfig::default().with_event_prefix("ev");
        apply_attribute(&mut doc, &config, node, "evPress", &PropValue::handler(|_| {})).unwrap();
        apply_attribute(&mut doc, &config, node, "online", &"yes".into()).unwrap();
        assert!(doc.listener(node, "evpress").unwrap().is_some());
        assert_eq!(doc.attribute(node, "online"), Some("yes"));
    }

    #[test]
    fn test_live_props_round_trip_is_applied() {
        let (mut doc, node) = element();
        let config = RenderConfig::default();
        let handler = PropValue::handler(|_| {});
        let style: PropValue = Style::map([("width", 10)]).into();
        apply_attribute(&mut doc, &config, node, "className", &"x".into()).unwrap();
        apply_attribute(&mut doc, &config, node, "style", &style).unwrap();
        apply_attribute(&mut doc, &config, node, "onClick", &handler).unwrap();

        let live = live_props(&doc, node).unwrap();
        assert!(is_applied(&live["class"], &"x".into(), &config));
        assert!(is_applied(&live["style"], &style, &config));
        assert!(is_applied(&live["onclick"], &handler, &config));
        assert!(!is_applied(&live["onclick"], &PropValue::handler(|_| {}), &config));
        assert!(!is_applied(&live["onclick"], &PropValue::Null, &config));
        assert!(is_applied(&live["style"], &"width: 10px".into(), &config));
    }

    #[test]
    fn test_leaves_nothing_for_inert_values() {
        let config = RenderConfig::default();
        assert!(leaves_nothing("title", &PropValue::Null, &config));
        assert!(leaves_nothing("onClick", &"not a handler".into(), &config));
        assert!(leaves_nothing("style", &Style::map([("width", "")]).into(), &config));
        assert!(leaves_nothing("style", &" ; ".into(), &config));

        assert!(!leaves_nothing("onClick", &PropValue::handler(|_| {}), &config));
        assert!(!leaves_nothing("style", &Style::map([("width", 1)]).into(), &config));
        assert!(!leaves_nothing("data-count", &0.into(), &config));
    }
}

//! Render configuration.
//!
//! One `RenderConfig` is owned by each [`Root`](crate::pipeline::Root). There is
//! no process-wide configuration state.

/// Attribute prop translated to the `class` attribute.
pub const CLASS_NAME_PROP: &str = "className";

/// Knobs for the attribute synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Unit appended to numeric style values.
    pub length_unit: String,
    /// Prefix that marks a prop as an event handler.
    pub event_prefix: String,
    /// Remove inline style properties missing from a new style mapping.
    ///
    /// Off by default: a style mapping only overwrites the properties it names.
    pub clear_stale_styles: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            length_unit: "px".to_string(),
            event_prefix: "on".to_string(),
            clear_stale_styles: false,
        }
    }
}

impl RenderConfig {
    /// Default configuration: `px` lengths, `on` event prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unit appended to numeric style values.
    pub fn with_length_unit(mut self, unit: impl Into<String>) -> Self {
        self.length_unit = unit.into();
        self
    }

    /// Set the prefix marking event handler props.
    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    /// Opt into removing style properties a new mapping does not name.
    pub fn with_clear_stale_styles(mut self, clear: bool) -> Self {
        self.clear_stale_styles = clear;
        self
    }

    /// Whether `name` is an event handler prop (prefix plus at least one character).
    pub fn is_event(&self, name: &str) -> bool {
        name.len() > self.event_prefix.len()
            && name
                .get(..self.event_prefix.len())
                .is_some_and(|p| p.eq_ignore_ascii_case(&self.event_prefix))
    }

    /// Normalized name a prop is stored under on the live node.
    ///
    /// Event props are lower-cased, `className` becomes `class`.
    pub fn attribute_name(&self, name: &str) -> String {
        if self.is_event(name) {
            name.to_ascii_lowercase()
        } else if name == CLASS_NAME_PROP {
            "class".to_string()
        } else {
            name.to_string()
        }
    }

    /// Listener name bound for an event kind (`click` -> `onclick`).
    pub fn listener_name(&self, kind: &str) -> String {
        format!("{}{}", self.event_prefix, kind).to_ascii_lowercase()
    }
}

//! Style compiler: cooking, merging, and named-child overrides.
//!
//! Styles are markup fragments keyed by name. Cooking resolves the `Style`
//! references *inside* each style's subtree (depth-first, idempotent), so
//! that applying a prepared style to a document element is a single merge
//! with no further lookups.

use std::collections::{BTreeMap, HashMap};

use craftkit_markup::Element;
use thiserror::Error;

// ── StyleCycleError ───────────────────────────────────────────────────────

/// Two or more styles reference each other. Reported like a parse failure;
/// cooking never loops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("style reference cycle: {}", cycle.join(" -> "))]
pub struct StyleCycleError {
    pub cycle: Vec<String>,
}

// ── Style / StyleSheet ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Style {
    pub name: String,
    pub node: Element,
    prepared: bool,
}

impl Style {
    pub fn new(name: impl Into<String>, node: Element) -> Self {
        Self { name: name.into(), node, prepared: false }
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }
}

/// All styles delivered with the current widget, cooked on first use.
#[derive(Debug, Default)]
pub struct StyleSheet {
    styles: HashMap<String, Style>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, style: Style) {
        self.styles.insert(style.name.clone(), style);
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    pub fn clear(&mut self) {
        self.styles.clear();
    }

    /// Prepares every style: resolves nested `Style` references inside each
    /// style's subtree, innermost first. Idempotent. Mutually-referencing
    /// styles fail with the cycle spelled out.
    pub fn cook(&mut self) -> Result<(), StyleCycleError> {
        let names: Vec<String> = self.styles.keys().cloned().collect();
        let mut visiting = Vec::new();
        for name in names {
            self.cook_one(&name, &mut visiting)?;
        }
        Ok(())
    }

    fn cook_one(&mut self, name: &str, visiting: &mut Vec<String>) -> Result<(), StyleCycleError> {
        // The in-progress style is out of the map, so the cycle check must
        // come before the lookup.
        if visiting.iter().any(|n| n == name) {
            let mut cycle = visiting.clone();
            cycle.push(name.to_string());
            return Err(StyleCycleError { cycle });
        }
        // Taken out of the map so nested lookups can borrow the sheet.
        let Some(mut style) = self.styles.remove(name) else {
            return Ok(());
        };
        if style.prepared {
            self.styles.insert(name.to_string(), style);
            return Ok(());
        }

        visiting.push(name.to_string());
        let result = self.cook_node(&mut style.node, visiting);
        style.prepared = result.is_ok();
        self.styles.insert(name.to_string(), style);
        visiting.pop();
        result
    }

    fn cook_node(&mut self, node: &mut Element, visiting: &mut Vec<String>) -> Result<(), StyleCycleError> {
        if let Some(style_name) = node.attr("Style").map(str::to_string) {
            self.cook_one(&style_name, visiting)?;
            node.remove_attr("Style");
            if let Some(style) = self.styles.get(&style_name) {
                apply_style(style, node);
            }
        }
        for child in &mut node.children {
            self.cook_node(child, visiting)?;
        }
        Ok(())
    }

    /// Applies `Style="..."` references throughout a document tree. Called on
    /// the scratch element tree before widget instantiation, after [`cook`]
    /// succeeded.
    ///
    /// [`cook`]: StyleSheet::cook
    pub fn apply_tree(&self, element: &mut Element) {
        if let Some(style_name) = element.attr("Style").map(str::to_string) {
            element.remove_attr("Style");
            match self.styles.get(&style_name) {
                Some(style) => apply_style(style, element),
                None => log::warn!("style {style_name:?} not found for <{}>", element.tag),
            }
        }
        for child in &mut element.children {
            self.apply_tree(child);
        }
    }
}

// ── apply_style ───────────────────────────────────────────────────────────

/// Merges a prepared style into an element.
///
/// No-op unless the style is prepared and the tags match. Attributes merge
/// first-wins: the element's own attributes are never overwritten. Style
/// children are cloned in; an element child whose `Name` matches a style
/// child's is removed and its attributes (minus `Name`) win over the clone's.
pub fn apply_style(style: &Style, element: &mut Element) {
    if !style.prepared || style.node.tag != element.tag {
        return;
    }

    for attr in &style.node.attrs {
        if attr.name == "Name" || element.has_attr(&attr.name) {
            continue;
        }
        element.push_attr(attr.name.clone(), attr.value.clone());
    }

    for style_child in &style.node.children {
        let mut clone = style_child.clone();
        if let Some(name) = style_child.name() {
            if let Some(idx) = element.children.iter().position(|c| c.name() == Some(name)) {
                let override_child = element.children.remove(idx);
                for attr in override_child.attrs {
                    if attr.name != "Name" {
                        clone.set_attr(&attr.name, attr.value);
                    }
                }
            }
        }
        element.children.push(clone);
    }
}

// ── Linear-descendant flattening ──────────────────────────────────────────

/// Conventional part names a composite button recognizes among its children.
fn button_part_names(tag: &str) -> &'static [&'static str] {
    match tag {
        "BevelledButtonWidget" => &[
            "BevelledButton.Canvas",
            "BevelledButton.Rectangle",
            "BevelledButton.Image",
            "BevelledButton.Label",
        ],
        "BitmapButtonWidget" => &["Button.Rectangle", "Button.Image", "Button.Label"],
        _ => &[],
    }
}

/// Extracts a composite button's named part children and serializes their
/// attributes into an `OverrideChildren` JSON attribute, keyed by the part
/// suffix (`Label`, `Rectangle`, ...). The widget builder consumes the
/// attribute when it constructs the button's internal parts.
pub fn flatten_button_parts(element: &mut Element) {
    let parts = button_part_names(&element.tag);
    if parts.is_empty() {
        return;
    }

    let mut overrides: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut kept = Vec::with_capacity(element.children.len());
    for child in element.children.drain(..) {
        match child.name() {
            Some(name) if parts.contains(&name) => {
                let key = name.rsplit('.').next().unwrap_or(name).to_string();
                let attrs = overrides.entry(key).or_default();
                for attr in &child.attrs {
                    if attr.name != "Name" {
                        attrs.insert(attr.name.clone(), attr.value.clone());
                    }
                }
            }
            _ => kept.push(child),
        }
    }
    element.children = kept;

    if !overrides.is_empty() {
        match serde_json::to_string(&overrides) {
            Ok(json) => element.set_attr("OverrideChildren", json),
            Err(e) => log::error!("override serialization failed: {e}"),
        }
    }
}

/// Deserializes the `OverrideChildren` attribute written by
/// [`flatten_button_parts`]. Missing or malformed → empty.
pub fn parse_override_children(value: Option<&str>) -> BTreeMap<String, BTreeMap<String, String>> {
    value
        .and_then(|v| serde_json::from_str(v).ok())
        .unwrap_or_default()
}

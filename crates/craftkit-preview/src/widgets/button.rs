use std::collections::BTreeMap;

use craftkit_engine::paint::Color;

use crate::attrs::AttrMap;
use crate::style::parse_override_children;

use super::shapes::BevelledRectangleAttrs;

/// Attribute overrides for a composite button's conventional parts, keyed by
/// part suffix (`Rectangle`, `Image`, `Label`, `Canvas`). Produced by style
/// flattening.
pub type PartOverrides = BTreeMap<String, BTreeMap<String, String>>;

// ── ButtonWidget ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonAttrs {
    pub text: String,
    pub color: Color,
    pub font_scale: f32,
    pub is_checkable: bool,
    pub is_checked: bool,
    pub is_auto_check: bool,
    pub subtexture: Option<String>,
    pub parts: PartOverrides,
}

impl ButtonAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self {
            text: attrs.string("Text", ""),
            color: attrs.color("Color", Color::WHITE),
            font_scale: attrs.f32("FontScale", 1.0),
            is_checkable: attrs.bool("IsCheckable", false),
            is_checked: attrs.bool("IsChecked", false),
            is_auto_check: attrs.bool("IsAutoCheckingButton", false),
            subtexture: attrs.get("Subtexture").map(str::to_string),
            parts: parse_override_children(attrs.get("OverrideChildren")),
        }
    }

    /// Override value for one attribute of a conventional part.
    pub fn part_attr(&self, part: &str, name: &str) -> Option<&str> {
        self.parts.get(part)?.get(name).map(String::as_str)
    }
}

// ── BevelledButtonWidget ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BevelledButtonAttrs {
    pub button: ButtonAttrs,
    pub bevel: BevelledRectangleAttrs,
}

impl BevelledButtonAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self {
            button: ButtonAttrs::from_attrs(attrs),
            bevel: BevelledRectangleAttrs::from_attrs(attrs),
        }
    }
}

// ── BitmapButtonWidget ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BitmapButtonAttrs {
    pub button: ButtonAttrs,
    pub normal_subtexture: Option<String>,
    pub clicked_subtexture: Option<String>,
}

impl BitmapButtonAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self {
            button: ButtonAttrs::from_attrs(attrs),
            normal_subtexture: attrs.get("NormalSubtexture").map(str::to_string),
            clicked_subtexture: attrs.get("ClickedSubtexture").map(str::to_string),
        }
    }
}

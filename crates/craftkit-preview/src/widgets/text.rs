use craftkit_engine::coords::Vec2;
use craftkit_engine::paint::Color;

use crate::attrs::{Alignment, AttrMap};
use crate::text::TextStyle;

// ── FontTextWidget ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FontTextAttrs {
    pub text: String,
    pub color: Color,
    pub style: TextStyle,
    pub text_h_align: Alignment,
    pub text_v_align: Alignment,
}

impl FontTextAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        let scale = attrs.f32("FontScale", 1.0);
        let spacing = attrs.pair("FontSpacing", Vec2::zero());
        Self {
            text: attrs.string("Text", ""),
            color: attrs.color("Color", Color::WHITE),
            style: TextStyle {
                font_scale: Vec2::new(scale, scale),
                letter_spacing: spacing.x,
                line_spacing: spacing.y,
                max_lines: attrs.u32("MaxLines", 0) as usize,
                vertical: attrs.get("Orientation") == Some("VerticalLeft"),
            },
            // Text centers inside its rect unless told otherwise.
            text_h_align: text_alignment(attrs.get("TextHorizontalAlignment")),
            text_v_align: text_alignment(attrs.get("TextVerticalAlignment")),
        }
    }
}

/// Unlike widget placement, text alignment defaults to `Center`, and
/// `Stretch` is not meaningful for glyphs.
fn text_alignment(value: Option<&str>) -> Alignment {
    match value {
        Some("Near") => Alignment::Near,
        Some("Far") => Alignment::Far,
        _ => Alignment::Center,
    }
}

// ── LabelWidget ───────────────────────────────────────────────────────────

/// A `FontTextWidget` whose `Text` may be a `[group:id]` language reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelAttrs {
    pub font: FontTextAttrs,
}

impl LabelAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self { font: FontTextAttrs::from_attrs(attrs) }
    }
}

//! Concrete widget kinds.
//!
//! One closed enum instead of a subclass hierarchy: each kind owns a typed
//! attribute struct with documented defaults and a full re-derivation
//! constructor. Capabilities (how a kind sizes itself, what it draws) are
//! matched over the enum rather than inherited.

mod button;
mod container;
mod shapes;
mod text;
mod valuebar;

pub use button::{BevelledButtonAttrs, BitmapButtonAttrs, ButtonAttrs};
pub use container::{ScrollPanelAttrs, StackPanelAttrs};
pub use shapes::{BevelledRectangleAttrs, RectangleAttrs};
pub use text::{FontTextAttrs, LabelAttrs};
pub use valuebar::{bar_segments, BarSegment, ValueBarAttrs};

use craftkit_engine::coords::Vec2;

use crate::attrs::{AttrMap, FlowDirection, SizeLength};
use crate::locale::LanguageTable;

// ── WidgetKind ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Canvas,
    StackPanel(StackPanelAttrs),
    UniformSpacingPanel(StackPanelAttrs),
    ScrollPanel(ScrollPanelAttrs),
    Rectangle(RectangleAttrs),
    BevelledRectangle(BevelledRectangleAttrs),
    FontText(FontTextAttrs),
    Label(LabelAttrs),
    Button(Box<ButtonAttrs>),
    BevelledButton(Box<BevelledButtonAttrs>),
    BitmapButton(Box<BitmapButtonAttrs>),
    ValueBar(ValueBarAttrs),
    Panorama,
    Unknown { original_tag: String },
}

impl WidgetKind {
    /// Full re-derivation from a tag and its attributes. Unrecognized tags
    /// become [`Unknown`](WidgetKind::Unknown) placeholders that keep their
    /// original tag for display.
    pub fn from_attrs(tag: &str, attrs: &AttrMap) -> WidgetKind {
        match tag {
            "CanvasWidget" => WidgetKind::Canvas,
            "StackPanelWidget" => WidgetKind::StackPanel(StackPanelAttrs::from_attrs(attrs)),
            "UniformSpacingPanelWidget" => {
                WidgetKind::UniformSpacingPanel(StackPanelAttrs::from_attrs(attrs))
            }
            "ScrollPanelWidget" => WidgetKind::ScrollPanel(ScrollPanelAttrs::from_attrs(attrs)),
            "RectangleWidget" => WidgetKind::Rectangle(RectangleAttrs::from_attrs(attrs)),
            "BevelledRectangleWidget" => {
                WidgetKind::BevelledRectangle(BevelledRectangleAttrs::from_attrs(attrs))
            }
            "FontTextWidget" => WidgetKind::FontText(FontTextAttrs::from_attrs(attrs)),
            "LabelWidget" => WidgetKind::Label(LabelAttrs::from_attrs(attrs)),
            "ButtonWidget" => WidgetKind::Button(Box::new(ButtonAttrs::from_attrs(attrs))),
            "BevelledButtonWidget" => {
                WidgetKind::BevelledButton(Box::new(BevelledButtonAttrs::from_attrs(attrs)))
            }
            "BitmapButtonWidget" => {
                WidgetKind::BitmapButton(Box::new(BitmapButtonAttrs::from_attrs(attrs)))
            }
            "ValueBarWidget" => WidgetKind::ValueBar(ValueBarAttrs::from_attrs(attrs)),
            "PanoramaWidget" => WidgetKind::Panorama,
            other => WidgetKind::Unknown { original_tag: other.to_string() },
        }
    }

    /// How the sizing pass derives a fit-content extent for this kind.
    pub fn sizing(&self) -> SizingModel {
        match self {
            WidgetKind::Canvas
            | WidgetKind::ScrollPanel(_)
            | WidgetKind::Panorama
            | WidgetKind::Button(_)
            | WidgetKind::BevelledButton(_)
            | WidgetKind::BitmapButton(_)
            | WidgetKind::Unknown { .. } => SizingModel::CanvasLike,
            WidgetKind::StackPanel(a) => SizingModel::StackLike(a.direction),
            WidgetKind::UniformSpacingPanel(a) => SizingModel::UniformLike(a.direction),
            WidgetKind::Rectangle(_)
            | WidgetKind::BevelledRectangle(_)
            | WidgetKind::FontText(_)
            | WidgetKind::Label(_)
            | WidgetKind::ValueBar(_) => SizingModel::Leaf,
        }
    }

    /// Content-determined extent for leaf kinds; `None` when the kind has no
    /// intrinsic content (bare rectangles size via their declared defaults).
    pub fn intrinsic_size(&self, language: &LanguageTable) -> Option<Vec2> {
        match self {
            WidgetKind::FontText(a) => Some(crate::text::measure(&a.text, &a.style)),
            WidgetKind::Label(a) => {
                Some(crate::text::measure(&language.resolve(&a.font.text), &a.font.style))
            }
            WidgetKind::ValueBar(a) => Some(a.intrinsic_size()),
            _ => None,
        }
    }

    /// Per-kind declared-size defaults, applied only when the markup carries
    /// no `Size` attribute: rectangles fill by default, panoramas stretch.
    pub fn default_declared_size(&self) -> Option<(SizeLength, SizeLength)> {
        match self {
            WidgetKind::Rectangle(_) | WidgetKind::BevelledRectangle(_) | WidgetKind::Panorama => {
                Some((SizeLength::Stretch, SizeLength::Stretch))
            }
            _ => None,
        }
    }

    pub fn default_clamp_to_bounds(&self) -> bool {
        matches!(self, WidgetKind::ScrollPanel(_))
    }
}

// ── SizingModel ───────────────────────────────────────────────────────────

/// Fit-content derivation rule for a widget kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SizingModel {
    /// Max child extent per axis; `Infinity` dominates.
    CanvasLike,
    /// Sum of positive child extents along the flow axis (`Infinity`
    /// short-circuits), max along the cross axis.
    StackLike(FlowDirection),
    /// `Infinity` along the flow axis, max along the cross axis.
    UniformLike(FlowDirection),
    /// Sized by intrinsic content, never by children.
    Leaf,
}

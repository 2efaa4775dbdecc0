//! Typed attribute access over markup elements.
//!
//! Every widget field is re-derived from attributes on each update: present →
//! parse, parse failure or absence → the field's documented default. Nothing
//! is sticky, so applying attribute sets A, B, A leaves exactly the state of
//! A, regardless of what B touched.

use std::collections::BTreeMap;

use craftkit_engine::coords::Vec2;
use craftkit_engine::paint::Color;
use craftkit_markup::Element;

// ── SizeLength ────────────────────────────────────────────────────────────

/// One axis of a declared widget size.
///
/// The classification is deliberately ternary and total:
/// - `"Infinity"` → [`Stretch`](SizeLength::Stretch)
/// - a non-negative number → [`Fixed`](SizeLength::Fixed)
/// - negative, empty, absent or unparsable → [`FitContent`](SizeLength::FitContent)
///
/// Negative numbers are *not* clamped fixed sizes; `"-5"` means fit-content.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum SizeLength {
    Stretch,
    Fixed(f32),
    #[default]
    FitContent,
}

impl SizeLength {
    pub fn parse(value: Option<&str>) -> SizeLength {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return SizeLength::FitContent;
        };
        if value == "Infinity" {
            return SizeLength::Stretch;
        }
        match value.parse::<f32>() {
            Ok(n) if n.is_finite() && n >= 0.0 => SizeLength::Fixed(n),
            _ => SizeLength::FitContent,
        }
    }

    pub fn is_fit_content(self) -> bool {
        matches!(self, SizeLength::FitContent)
    }

    /// The authoritative length, if this axis has one. `Stretch` maps to
    /// `INFINITY` (the sentinel the sizing pass works in); fit-content has no
    /// authoritative value and returns `None`.
    pub fn authoritative(self) -> Option<f32> {
        match self {
            SizeLength::Stretch => Some(f32::INFINITY),
            SizeLength::Fixed(n) => Some(n),
            SizeLength::FitContent => None,
        }
    }
}

// ── Alignment / FlowDirection ─────────────────────────────────────────────

/// Per-axis placement of a widget inside the slot its parent gives it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Alignment {
    Near,
    Center,
    Far,
    #[default]
    Stretch,
}

impl Alignment {
    pub fn parse(value: Option<&str>) -> Alignment {
        match value {
            Some("Near") => Alignment::Near,
            Some("Center") => Alignment::Center,
            Some("Far") => Alignment::Far,
            _ => Alignment::Stretch,
        }
    }
}

/// Main axis of a stack- or bar-like widget.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FlowDirection {
    #[default]
    Horizontal,
    Vertical,
}

impl FlowDirection {
    pub fn parse(value: Option<&str>) -> FlowDirection {
        match value {
            Some("Vertical") => FlowDirection::Vertical,
            _ => FlowDirection::Horizontal,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, FlowDirection::Horizontal)
    }
}

// ── AttrMap ───────────────────────────────────────────────────────────────

/// Read view over an element's attributes, with an optional override map laid
/// on top (override-wins). The override map is how flattened button parts
/// receive the attributes that were declared on extracted named children.
#[derive(Debug, Copy, Clone)]
pub struct AttrMap<'a> {
    element: &'a Element,
    overrides: Option<&'a BTreeMap<String, String>>,
}

impl<'a> AttrMap<'a> {
    pub fn new(element: &'a Element) -> Self {
        Self { element, overrides: None }
    }

    pub fn with_overrides(element: &'a Element, overrides: &'a BTreeMap<String, String>) -> Self {
        Self { element, overrides: Some(overrides) }
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        if let Some(ov) = self.overrides {
            if let Some(v) = ov.get(name) {
                return Some(v.as_str());
            }
        }
        self.element.attr(name)
    }

    pub fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    pub fn f32(&self, name: &str, default: f32) -> f32 {
        match self.get(name).map(|v| v.trim().parse::<f32>()) {
            Some(Ok(n)) if n.is_finite() => n,
            _ => default,
        }
    }

    pub fn u32(&self, name: &str, default: u32) -> u32 {
        match self.get(name).map(|v| v.trim().parse::<u32>()) {
            Some(Ok(n)) => n,
            _ => default,
        }
    }

    pub fn bool(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some("true") => true,
            Some("false") => false,
            _ => default,
        }
    }

    pub fn color(&self, name: &str, default: Color) -> Color {
        match self.get(name) {
            Some(v) => Color::parse(v).unwrap_or(default),
            None => default,
        }
    }

    /// `"X,Y"` pair. Each component falls back to its default independently,
    /// so `"10,garbage"` yields `(10, default.y)`.
    pub fn pair(&self, name: &str, default: Vec2) -> Vec2 {
        let Some(value) = self.get(name) else {
            return default;
        };
        let mut parts = value.split(',').map(str::trim);
        let comp = |part: Option<&str>, fallback: f32| match part.map(str::parse::<f32>) {
            Some(Ok(n)) if n.is_finite() => n,
            _ => fallback,
        };
        let x = comp(parts.next(), default.x);
        let y = comp(parts.next(), default.y);
        Vec2::new(x, y)
    }

    pub fn alignment(&self, name: &str) -> Alignment {
        Alignment::parse(self.get(name))
    }

    pub fn flow(&self, name: &str) -> FlowDirection {
        FlowDirection::parse(self.get(name))
    }

    /// The declared `Size="W,H"` as a per-axis [`SizeLength`] pair.
    pub fn size_pair(&self, name: &str) -> (SizeLength, SizeLength) {
        let Some(value) = self.get(name) else {
            return (SizeLength::FitContent, SizeLength::FitContent);
        };
        let mut parts = value.split(',').map(str::trim);
        let w = SizeLength::parse(parts.next());
        let h = SizeLength::parse(parts.next());
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftkit_markup::parse_str;

    fn element(attrs: &str) -> Element {
        parse_str(&format!("<Widget {attrs} />")).unwrap().root
    }

    // ── SizeLength ternary classification ─────────────────────────────────

    #[test]
    fn size_length_infinity_is_stretch() {
        assert_eq!(SizeLength::parse(Some("Infinity")), SizeLength::Stretch);
    }

    #[test]
    fn size_length_non_negative_is_fixed() {
        assert_eq!(SizeLength::parse(Some("0")), SizeLength::Fixed(0.0));
        assert_eq!(SizeLength::parse(Some("120.5")), SizeLength::Fixed(120.5));
    }

    #[test]
    fn size_length_negative_is_fit_content() {
        // A negative declared size is not a clamped fixed size.
        assert_eq!(SizeLength::parse(Some("-5")), SizeLength::FitContent);
    }

    #[test]
    fn size_length_garbage_and_absent_are_fit_content() {
        assert_eq!(SizeLength::parse(Some("wide")), SizeLength::FitContent);
        assert_eq!(SizeLength::parse(Some("")), SizeLength::FitContent);
        assert_eq!(SizeLength::parse(Some("NaN")), SizeLength::FitContent);
        assert_eq!(SizeLength::parse(None), SizeLength::FitContent);
    }

    // ── typed getters ─────────────────────────────────────────────────────

    #[test]
    fn color_falls_back_on_parse_failure() {
        let el = element(r#"FillColor="not-a-color""#);
        let attrs = AttrMap::new(&el);
        assert_eq!(attrs.color("FillColor", Color::WHITE), Color::WHITE);
    }

    #[test]
    fn pair_components_fall_back_independently() {
        let el = element(r#"Margin="10,garbage""#);
        let attrs = AttrMap::new(&el);
        assert_eq!(attrs.pair("Margin", Vec2::new(1.0, 2.0)), Vec2::new(10.0, 2.0));
    }

    #[test]
    fn bool_only_accepts_exact_literals() {
        let el = element(r#"A="true" B="False" C="1""#);
        let attrs = AttrMap::new(&el);
        assert!(attrs.bool("A", false));
        assert!(attrs.bool("B", true));
        assert!(!attrs.bool("C", false));
    }

    #[test]
    fn unknown_alignment_is_stretch() {
        let el = element(r#"HorizontalAlignment="Middle""#);
        assert_eq!(AttrMap::new(&el).alignment("HorizontalAlignment"), Alignment::Stretch);
    }

    #[test]
    fn size_pair_mixed_forms() {
        let el = element(r#"Size="Infinity,48""#);
        let (w, h) = AttrMap::new(&el).size_pair("Size");
        assert_eq!(w, SizeLength::Stretch);
        assert_eq!(h, SizeLength::Fixed(48.0));
    }

    #[test]
    fn overrides_win_over_element_attrs() {
        let el = element(r#"Text="original""#);
        let mut ov = BTreeMap::new();
        ov.insert("Text".to_string(), "patched".to_string());
        let attrs = AttrMap::with_overrides(&el, &ov);
        assert_eq!(attrs.get("Text"), Some("patched"));
    }
}

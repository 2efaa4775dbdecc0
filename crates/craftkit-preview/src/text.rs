//! Text measurement.
//!
//! The preview does not rasterize the game's bitmap font; it reproduces the
//! game's metric model instead, which is enough for layout to match: a glyph
//! box of 19 px with a 25.5 px line height, where CJK code points advance one
//! full unit and everything else half a unit.

use craftkit_engine::coords::Vec2;

pub const GLYPH_SIZE: f32 = 19.0;
pub const LINE_HEIGHT: f32 = 25.5;

/// Measurement inputs shared by `FontTextWidget` and `LabelWidget`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub font_scale: Vec2,
    /// Extra advance per glyph (`FontSpacing` x component).
    pub letter_spacing: f32,
    /// Extra height per line (`FontSpacing` y component).
    pub line_spacing: f32,
    /// 0 means unlimited.
    pub max_lines: usize,
    /// `Orientation="VerticalLeft"` swaps the measured axes.
    pub vertical: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_scale: Vec2::new(1.0, 1.0),
            letter_spacing: 0.0,
            line_spacing: 0.0,
            max_lines: 0,
            vertical: false,
        }
    }
}

/// Advance units for one code point: CJK counts a full glyph box, everything
/// else half of one.
fn char_units(c: char) -> f32 {
    let cjk = matches!(u32::from(c),
        0x1100..=0x11FF        // Hangul Jamo
        | 0x2E80..=0x9FFF      // CJK radicals .. unified ideographs
        | 0xAC00..=0xD7A3      // Hangul syllables
        | 0xF900..=0xFAFF      // compatibility ideographs
        | 0xFF00..=0xFF60      // fullwidth forms
        | 0x20000..=0x2FA1F    // extensions
    );
    if cjk { 1.0 } else { 0.5 }
}

/// Splits on `\n` and truncates to `max_lines` (0 = unlimited). Render and
/// measurement both go through this, so a truncated line never contributes
/// to the widget's size.
pub fn visible_lines(text: &str, max_lines: usize) -> Vec<&str> {
    let lines = text.split('\n');
    match max_lines {
        0 => lines.collect(),
        n => lines.take(n).collect(),
    }
}

pub fn line_width(line: &str, style: &TextStyle) -> f32 {
    let units: f32 = line.chars().map(char_units).sum();
    units * (GLYPH_SIZE * style.font_scale.x + style.letter_spacing)
}

/// Measured extent of the text block under the metric model.
pub fn measure(text: &str, style: &TextStyle) -> Vec2 {
    let lines = visible_lines(text, style.max_lines);
    let width = lines
        .iter()
        .map(|l| line_width(l, style))
        .fold(0.0f32, f32::max);
    let height =
        (LINE_HEIGHT + style.line_spacing) * style.font_scale.y * lines.len() as f32;
    if style.vertical {
        Vec2::new(height, width)
    } else {
        Vec2::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_counts_half_units() {
        let size = measure("abcd", &TextStyle::default());
        assert_eq!(size.x, 2.0 * GLYPH_SIZE);
        assert_eq!(size.y, LINE_HEIGHT);
    }

    #[test]
    fn cjk_counts_full_units() {
        let size = measure("你好", &TextStyle::default());
        assert_eq!(size.x, 2.0 * GLYPH_SIZE);
    }

    #[test]
    fn widest_line_wins() {
        let size = measure("ab\nabcdef\ncd", &TextStyle::default());
        assert_eq!(size.x, 3.0 * GLYPH_SIZE);
        assert_eq!(size.y, 3.0 * LINE_HEIGHT);
    }

    #[test]
    fn max_lines_truncates_before_measurement() {
        let style = TextStyle { max_lines: 1, ..Default::default() };
        let size = measure("ab\nabcdef", &style);
        assert_eq!(size.x, 1.0 * GLYPH_SIZE);
        assert_eq!(size.y, LINE_HEIGHT);
    }

    #[test]
    fn font_scale_and_spacing_apply() {
        let style = TextStyle {
            font_scale: Vec2::new(2.0, 2.0),
            letter_spacing: 1.0,
            line_spacing: 0.5,
            ..Default::default()
        };
        let size = measure("ab", &style);
        assert_eq!(size.x, 1.0 * (GLYPH_SIZE * 2.0 + 1.0));
        assert_eq!(size.y, (LINE_HEIGHT + 0.5) * 2.0);
    }

    #[test]
    fn vertical_orientation_swaps_axes() {
        let h = measure("abcd", &TextStyle::default());
        let v = measure("abcd", &TextStyle { vertical: true, ..Default::default() });
        assert_eq!(v, Vec2::new(h.y, h.x));
    }
}

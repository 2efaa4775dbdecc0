use std::fmt;
use std::str::FromStr;

// ── Color ─────────────────────────────────────────────────────────────────

/// Straight-alpha RGBA color with 8-bit channels.
///
/// This is the color model of the markup itself: attribute values parse into
/// it, style defaults are written in it, and interpolation (bar gradients,
/// disabled tints) happens on it channel by channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Parses the two attribute color forms.
    ///
    /// - Hex, `#`-prefixed: 3/4 digits (one nibble per channel, doubled) or
    ///   6/8 digits. Alpha defaults to 255.
    /// - Decimal: `R,G,B` or `R,G,B,A` with each component in `0..=255`.
    pub fn parse(s: &str) -> Result<Color, ColorParseError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| ColorParseError::new(s));
        }
        Self::parse_decimal(s).ok_or_else(|| ColorParseError::new(s))
    }

    fn parse_hex(hex: &str) -> Option<Color> {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            // Short forms double each nibble: #1af → #11aaff.
            3 | 4 => {
                let mut c = [0u8; 4];
                c[3] = 255;
                for (slot, i) in c.iter_mut().zip(0..hex.len()) {
                    let n = nibble(i)?;
                    *slot = n << 4 | n;
                }
                Some(Color::new(c[0], c[1], c[2], c[3]))
            }
            6 | 8 => {
                let mut c = [0u8; 4];
                c[3] = 255;
                for (slot, i) in c.iter_mut().zip((0..hex.len()).step_by(2)) {
                    *slot = byte(i)?;
                }
                Some(Color::new(c[0], c[1], c[2], c[3]))
            }
            _ => None,
        }
    }

    fn parse_decimal(s: &str) -> Option<Color> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>().ok());
        let r = parts.next()??;
        let g = parts.next()??;
        let b = parts.next()??;
        let a = match parts.next() {
            Some(a) => a?,
            None => 255,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Color::new(r, g, b, a))
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::new(
            ch(self.r, other.r),
            ch(self.g, other.g),
            ch(self.b, other.b),
            ch(self.a, other.a),
        )
    }

    /// Scales RGB by `f` (clamped per channel), leaving alpha untouched.
    /// Bar outlines and disabled states use this to darken a base color.
    pub fn mul_rgb(self, f: f32) -> Color {
        let ch = |c: u8| ((c as f32 * f).round().clamp(0.0, 255.0)) as u8;
        Color::new(ch(self.r), ch(self.g), ch(self.b), self.a)
    }

    /// CSS serialization used by the host protocol: `rgba(R,G,B,A)` with the
    /// alpha channel scaled to `[0, 1]`.
    pub fn to_css_string(self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a as f32 / 255.0)
    }

    /// Straight-alpha components scaled to `[0, 1]`, for vertex colors.
    #[inline]
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

// ── ColorParseError ───────────────────────────────────────────────────────

/// The attribute value was neither a recognized hex form nor a decimal list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    pub value: String,
}

impl ColorParseError {
    fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color value {:?}", self.value)
    }
}

impl std::error::Error for ColorParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Color { Color::parse(s).unwrap() }

    // ── parsing ───────────────────────────────────────────────────────────

    #[test]
    fn hex_six_digits() {
        assert_eq!(c("#108C00"), Color::new(0x10, 0x8C, 0x00, 255));
    }

    #[test]
    fn hex_eight_digits() {
        assert_eq!(c("#108C0080"), Color::new(0x10, 0x8C, 0x00, 0x80));
    }

    #[test]
    fn hex_short_forms_double_nibbles() {
        assert_eq!(c("#1af"), Color::new(0x11, 0xAA, 0xFF, 255));
        assert_eq!(c("#1af8"), Color::new(0x11, 0xAA, 0xFF, 0x88));
    }

    #[test]
    fn decimal_three_components_is_opaque() {
        assert_eq!(c("255, 128, 0"), Color::new(255, 128, 0, 255));
    }

    #[test]
    fn decimal_four_components() {
        assert_eq!(c("10,20,30,40"), Color::new(10, 20, 30, 40));
    }

    #[test]
    fn surrounding_whitespace_accepted() {
        assert_eq!(c("  #fff  "), Color::WHITE);
    }

    #[test]
    fn hex_and_decimal_notations_agree() {
        assert_eq!(c("#FF8000"), c("255,128,0"));
        assert_eq!(c("#FF8000").to_css_string(), c("255,128,0").to_css_string());
    }

    #[test]
    fn rejects_bad_values() {
        for bad in ["", "#12345", "#xyzxyz", "1,2", "1,2,3,4,5", "256,0,0", "1;2;3", "red"] {
            assert!(Color::parse(bad).is_err(), "expected {bad:?} to fail");
        }
    }

    // ── operations ────────────────────────────────────────────────────────

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Color::new(0, 0, 0, 0);
        let b = Color::new(200, 100, 50, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::new(100, 50, 25, 128));
    }

    #[test]
    fn lerp_clamps_t() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(a.lerp(b, -1.0), a);
        assert_eq!(a.lerp(b, 2.0), b);
    }

    #[test]
    fn mul_rgb_keeps_alpha() {
        let base = Color::new(200, 100, 40, 77);
        assert_eq!(base.mul_rgb(0.75), Color::new(150, 75, 30, 77));
    }

    #[test]
    fn css_string_scales_alpha() {
        assert_eq!(Color::new(16, 140, 0, 255).to_css_string(), "rgba(16,140,0,1)");
        assert_eq!(Color::new(0, 0, 0, 0).to_css_string(), "rgba(0,0,0,0)");
    }
}

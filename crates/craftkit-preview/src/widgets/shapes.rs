use craftkit_engine::coords::Vec2;
use craftkit_engine::paint::Color;

use crate::attrs::AttrMap;

// ── RectangleWidget ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleAttrs {
    pub fill_color: Color,
    pub outline_color: Color,
    pub outline_thickness: f32,
    /// Optional `{path}` or `{Atlas/Name}` texture reference.
    pub subtexture: Option<String>,
    pub texcoord1: Vec2,
    pub texcoord2: Vec2,
    pub texture_linear_filter: bool,
}

impl RectangleAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self {
            fill_color: attrs.color("FillColor", Color::TRANSPARENT),
            outline_color: attrs.color("OutlineColor", Color::TRANSPARENT),
            outline_thickness: attrs.f32("OutlineThickness", 1.0),
            subtexture: attrs.get("Subtexture").map(str::to_string),
            texcoord1: attrs.pair("Texcoord1", Vec2::new(0.0, 0.0)),
            texcoord2: attrs.pair("Texcoord2", Vec2::new(1.0, 1.0)),
            texture_linear_filter: attrs.bool("TextureLinearFilter", false),
        }
    }
}

// ── BevelledRectangleWidget ───────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BevelledRectangleAttrs {
    pub bevel_color: Color,
    pub center_color: Color,
    pub bevel_size: f32,
    pub ambient_light: f32,
    pub directional_light: f32,
}

impl BevelledRectangleAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self {
            bevel_color: attrs.color("BevelColor", Color::opaque(0x4C, 0x4C, 0x4C)),
            center_color: attrs.color("CenterColor", Color::opaque(0x33, 0x33, 0x33)),
            bevel_size: attrs.f32("BevelSize", 2.0),
            ambient_light: attrs.f32("AmbientLight", 0.6),
            directional_light: attrs.f32("DirectionalLight", 0.4),
        }
    }

    /// Top/left bevel face brightness (lit) and bottom/right (shadowed).
    pub fn lit_color(&self) -> Color {
        self.bevel_color.mul_rgb(self.ambient_light + self.directional_light)
    }

    pub fn shadow_color(&self) -> Color {
        self.bevel_color.mul_rgb(self.ambient_light)
    }
}

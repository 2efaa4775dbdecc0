use craftkit_engine::coords::Vec2;
use craftkit_engine::paint::Color;

use crate::attrs::{AttrMap, FlowDirection};

// ── ValueBarWidget ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ValueBarAttrs {
    pub bars_count: u32,
    /// Filled fraction in `[0, 1]`.
    pub value: f32,
    /// On-screen extent of one bar, width by height in both orientations.
    pub bar_size: Vec2,
    /// Gap between consecutive bars along the flow axis.
    pub spacing: f32,
    pub direction: FlowDirection,
    /// Fill from the far end instead of the near end.
    pub flip_direction: bool,
    pub lit_color: Color,
    /// Non-transparent enables a lit-color gradient across the bars.
    pub lit_color2: Color,
    pub unlit_color: Color,
    /// `false` snaps each bar to fully lit or fully unlit.
    pub bar_blending: bool,
    /// Splits every bar into two independently-lit halves.
    pub half_bars: bool,
    pub bar_subtexture: Option<String>,
}

impl ValueBarAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self {
            bars_count: attrs.u32("BarsCount", 8).max(1),
            value: attrs.f32("Value", 0.0).clamp(0.0, 1.0),
            bar_size: attrs.pair("BarSize", Vec2::new(24.0, 24.0)),
            spacing: attrs.f32("Spacing", 0.0),
            direction: attrs.flow("Direction"),
            flip_direction: attrs.bool("FlipDirection", false),
            lit_color: attrs.color("LitBarColor", Color::opaque(16, 140, 0)),
            lit_color2: attrs.color("LitBarColor2", Color::TRANSPARENT),
            unlit_color: attrs.color("UnlitBarColor", Color::opaque(48, 48, 48)),
            bar_blending: attrs.bool("BarBlending", true),
            half_bars: attrs.bool("HalfBars", false),
            bar_subtexture: attrs.get("BarSubtexture").map(str::to_string),
        }
    }

    /// Extent of one bar along the flow axis: its width when horizontal, its
    /// height when vertical.
    pub fn flow_extent(&self) -> f32 {
        match self.direction {
            FlowDirection::Horizontal => self.bar_size.x,
            FlowDirection::Vertical => self.bar_size.y,
        }
    }

    /// Extent of one bar across the flow axis.
    pub fn cross_extent(&self) -> f32 {
        match self.direction {
            FlowDirection::Horizontal => self.bar_size.y,
            FlowDirection::Vertical => self.bar_size.x,
        }
    }

    pub fn intrinsic_size(&self) -> Vec2 {
        let flow = (self.flow_extent() + self.spacing) * self.bars_count as f32;
        match self.direction {
            FlowDirection::Horizontal => Vec2::new(flow, self.bar_size.y),
            FlowDirection::Vertical => Vec2::new(self.bar_size.x, flow),
        }
    }
}

// ── Segment computation ───────────────────────────────────────────────────

/// One quad of the bar: placement along the flow axis plus resolved color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BarSegment {
    /// Offset of the quad's near edge along the flow axis.
    pub offset: f32,
    /// Quad extent along the flow axis (half a bar when `HalfBars`).
    pub width: f32,
    /// How lit this segment is, in `[0, 1]`, after blending rules.
    pub fraction: f32,
    /// Final fill color (unlit→lit interpolation already applied).
    pub color: Color,
}

/// Resolves every segment of the bar.
///
/// Bars advance in half-bar positions `pos = 0, 1, ...` (or `0, 0.5, 1, ...`
/// with `HalfBars`); each position lights up by how far `value` reaches past
/// it, and `FlipDirection` mirrors the reach. The run leads with half a
/// spacing gap. The two-stage color interpolation (lit gradient by position,
/// then unlit→lit by fraction) is what the game renders, so it is preserved
/// exactly.
pub fn bar_segments(attrs: &ValueBarAttrs) -> Vec<BarSegment> {
    let bars = attrs.bars_count as f32;
    let extent = attrs.flow_extent();
    let step = if attrs.half_bars { 1 } else { 2 };
    let mut segments = Vec::with_capacity((attrs.bars_count as usize) * 2 / step);

    for i in (0..attrs.bars_count * 2).step_by(step) {
        let pos = 0.5 * i as f32;

        let reach = if attrs.flip_direction {
            attrs.value - (bars - pos - 1.0) / bars
        } else {
            attrs.value - pos / bars
        };
        let mut fraction = (reach * bars).clamp(0.0, 1.0);
        if !attrs.bar_blending {
            fraction = fraction.ceil();
        }

        let lit = if !attrs.lit_color2.is_transparent() && attrs.bars_count > 1 {
            attrs.lit_color.lerp(attrs.lit_color2, pos / (bars - 1.0))
        } else {
            attrs.lit_color
        };
        let color = attrs.unlit_color.lerp(lit, fraction);

        let bar_index = pos.floor();
        let half_offset = (pos - bar_index) * extent;
        let width = if attrs.half_bars { extent * 0.5 } else { extent };
        segments.push(BarSegment {
            offset: attrs.spacing * 0.5 + bar_index * (extent + attrs.spacing) + half_offset,
            width,
            fraction,
            color,
        });
    }
    segments
}

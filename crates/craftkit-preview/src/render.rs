//! Paint pass: widget tree + resolved rects → renderer commands.
//!
//! Runs front-to-back in tree order; flat quads and textured quads batch in
//! the renderer. Text is drawn as metric-accurate glyph boxes (the preview
//! approximation), so layout and alignment read correctly without the game's
//! bitmap font.

use std::time::Instant;

use craftkit_engine::coords::{Rect, Vec2};
use craftkit_engine::paint::Color;
use craftkit_engine::render::{FilterMode, Renderer2d, TextureId, Vertex};

use crate::assets::{AssetBridge, AssetState, AtlasCatalog};
use crate::attrs::Alignment;
use crate::locale::LanguageTable;
use crate::text::{self, TextStyle};
use crate::tree::{NodeId, WidgetTree};
use crate::widgets::{bar_segments, BevelledRectangleAttrs, WidgetKind};

/// RGB factor applied to everything inside a disabled subtree.
const DISABLED_DIM: f32 = 0.6;

pub struct RenderCtx<'a> {
    pub renderer: &'a mut Renderer2d,
    pub assets: &'a mut AssetBridge,
    pub atlas: &'a AtlasCatalog,
    pub language: &'a LanguageTable,
    pub now: Instant,
}

pub fn render_tree(tree: &WidgetTree, rects: &[Rect], ctx: &mut RenderCtx) {
    if let Some(root) = tree.root() {
        render_node(tree, root, rects, ctx);
    }
}

fn render_node(tree: &WidgetTree, id: NodeId, rects: &[Rect], ctx: &mut RenderCtx) {
    let node = tree.node(id);
    if !node.base.is_visible {
        return;
    }
    let rect = rects[id.0];
    let dim = !node.base.effective_enabled();

    match &node.kind {
        WidgetKind::Canvas
        | WidgetKind::StackPanel(_)
        | WidgetKind::UniformSpacingPanel(_)
        | WidgetKind::ScrollPanel(_) => {}

        WidgetKind::Panorama => {
            // Stand-in for the game's scrolling backdrop.
            ctx.renderer.fill_rect(rect, tint(Color::opaque(0x16, 0x1E, 0x2A), dim));
        }

        WidgetKind::Rectangle(attrs) => {
            let textured = attrs
                .subtexture
                .as_deref()
                .and_then(|r| resolve_texture(ctx, r, attrs.texture_linear_filter));
            match textured {
                Some((texture, uv)) => {
                    let sub_uv = Rect::new(
                        uv.origin.x + attrs.texcoord1.x * uv.size.x,
                        uv.origin.y + attrs.texcoord1.y * uv.size.y,
                        (attrs.texcoord2.x - attrs.texcoord1.x) * uv.size.x,
                        (attrs.texcoord2.y - attrs.texcoord1.y) * uv.size.y,
                    );
                    let fill = if attrs.fill_color.is_transparent() {
                        Color::WHITE
                    } else {
                        attrs.fill_color
                    };
                    ctx.renderer.draw_texture(texture, rect, sub_uv, tint(fill, dim));
                }
                None => ctx.renderer.fill_rect(rect, tint(attrs.fill_color, dim)),
            }
            if !attrs.outline_color.is_transparent() && attrs.outline_thickness > 0.0 {
                ctx.renderer.stroke_rect(rect, tint(attrs.outline_color, dim));
            }
        }

        WidgetKind::BevelledRectangle(attrs) => draw_bevel(ctx, rect, attrs, dim),

        WidgetKind::FontText(attrs) => {
            draw_text(ctx, rect, &attrs.text, &attrs.style, tint(attrs.color, dim),
                attrs.text_h_align, attrs.text_v_align);
        }

        WidgetKind::Label(attrs) => {
            let resolved = ctx.language.resolve(&attrs.font.text);
            draw_text(ctx, rect, &resolved, &attrs.font.style, tint(attrs.font.color, dim),
                attrs.font.text_h_align, attrs.font.text_v_align);
        }

        WidgetKind::Button(attrs) => {
            if let Some(fill) = attrs
                .part_attr("Rectangle", "FillColor")
                .and_then(|v| Color::parse(v).ok())
            {
                ctx.renderer.fill_rect(rect, tint(fill, dim));
            }
            if let Some(reference) = attrs.subtexture.as_deref() {
                if let Some((texture, uv)) = resolve_texture(ctx, reference, false) {
                    ctx.renderer.draw_texture(texture, rect, uv, tint(Color::WHITE, dim));
                }
            }
            draw_button_text(ctx, rect, &attrs.text, attrs.color, attrs.font_scale, attrs.parts.get("Label"), dim);
        }

        WidgetKind::BevelledButton(attrs) => {
            let mut bevel = attrs.bevel;
            if let Some(v) = attrs.button.part_attr("Rectangle", "CenterColor") {
                bevel.center_color = Color::parse(v).unwrap_or(bevel.center_color);
            }
            if let Some(v) = attrs.button.part_attr("Rectangle", "BevelColor") {
                bevel.bevel_color = Color::parse(v).unwrap_or(bevel.bevel_color);
            }
            draw_bevel(ctx, rect, &bevel, dim);
            draw_button_text(ctx, rect, &attrs.button.text, attrs.button.color,
                attrs.button.font_scale, attrs.button.parts.get("Label"), dim);
        }

        WidgetKind::BitmapButton(attrs) => {
            let reference = if attrs.button.is_checked {
                attrs.clicked_subtexture.as_deref().or(attrs.normal_subtexture.as_deref())
            } else {
                attrs.normal_subtexture.as_deref()
            };
            match reference.and_then(|r| resolve_texture(ctx, r, false)) {
                Some((texture, uv)) => {
                    ctx.renderer.draw_texture(texture, rect, uv, tint(Color::WHITE, dim));
                }
                None => ctx.renderer.fill_rect(rect, tint(Color::opaque(0x30, 0x30, 0x30), dim)),
            }
            draw_button_text(ctx, rect, &attrs.button.text, attrs.button.color,
                attrs.button.font_scale, attrs.button.parts.get("Label"), dim);
        }

        WidgetKind::ValueBar(attrs) => {
            let textured = attrs
                .bar_subtexture
                .as_deref()
                .and_then(|r| resolve_texture(ctx, r, false));
            let horizontal = attrs.direction.is_horizontal();
            for segment in bar_segments(attrs) {
                let seg_rect = if horizontal {
                    Rect::new(
                        rect.origin.x + segment.offset,
                        rect.origin.y,
                        segment.width,
                        attrs.cross_extent().min(rect.size.y),
                    )
                } else {
                    Rect::new(
                        rect.origin.x,
                        rect.origin.y + segment.offset,
                        attrs.cross_extent().min(rect.size.x),
                        segment.width,
                    )
                };
                let color = tint(segment.color, dim);
                match textured {
                    Some((texture, uv)) => {
                        ctx.renderer.draw_texture(texture, seg_rect, uv, color);
                    }
                    None => {
                        ctx.renderer.fill_rect(seg_rect, color);
                        ctx.renderer.stroke_rect(seg_rect, color.mul_rgb(0.75));
                    }
                }
            }
        }

        WidgetKind::Unknown { original_tag } => {
            ctx.renderer.stroke_rect(rect, tint(Color::opaque(0xCC, 0x44, 0x44), dim));
            draw_text(
                ctx,
                rect,
                original_tag,
                &TextStyle { max_lines: 1, ..Default::default() },
                tint(Color::opaque(0xCC, 0x44, 0x44), dim),
                Alignment::Center,
                Alignment::Center,
            );
        }
    }

    for &child in &node.children {
        render_node(tree, child, rects, ctx);
    }
}

fn tint(color: Color, disabled: bool) -> Color {
    if disabled {
        color.mul_rgb(DISABLED_DIM)
    } else {
        color
    }
}

// ── Bevel chrome ──────────────────────────────────────────────────────────

/// Center fill plus four bevel faces; top/left catch the directional light,
/// bottom/right sit in shadow.
fn draw_bevel(ctx: &mut RenderCtx, rect: Rect, attrs: &BevelledRectangleAttrs, dim: bool) {
    let b = attrs.bevel_size.max(0.0).min(rect.size.x * 0.5).min(rect.size.y * 0.5);
    let (min, max) = (rect.min(), rect.max());
    let inner = Rect::new(min.x + b, min.y + b, rect.size.x - 2.0 * b, rect.size.y - 2.0 * b);
    ctx.renderer.fill_rect(inner, tint(attrs.center_color, dim));
    if b <= 0.0 {
        return;
    }

    let lit = tint(attrs.lit_color(), dim);
    let shadow = tint(attrs.shadow_color(), dim);
    let (imin, imax) = (inner.min(), inner.max());
    let quad = |ctx: &mut RenderCtx, corners: [Vec2; 4], color: Color| {
        ctx.renderer.fill_quad([
            Vertex::flat(corners[0], color),
            Vertex::flat(corners[1], color),
            Vertex::flat(corners[2], color),
            Vertex::flat(corners[3], color),
        ]);
    };

    // Top and left faces are lit.
    quad(ctx, [min, Vec2::new(max.x, min.y), Vec2::new(imax.x, imin.y), imin], lit);
    quad(ctx, [min, imin, Vec2::new(imin.x, imax.y), Vec2::new(min.x, max.y)], lit);
    // Bottom and right are shadowed.
    quad(ctx, [Vec2::new(min.x, max.y), Vec2::new(imin.x, imax.y), imax, max], shadow);
    quad(ctx, [Vec2::new(max.x, min.y), max, imax, Vec2::new(imax.x, imin.y)], shadow);
}

// ── Text ──────────────────────────────────────────────────────────────────

fn draw_button_text(
    ctx: &mut RenderCtx,
    rect: Rect,
    text: &str,
    color: Color,
    font_scale: f32,
    label_overrides: Option<&std::collections::BTreeMap<String, String>>,
    dim: bool,
) {
    if text.is_empty() {
        return;
    }
    let color = label_overrides
        .and_then(|m| m.get("Color"))
        .and_then(|v| Color::parse(v).ok())
        .unwrap_or(color);
    let style = TextStyle {
        font_scale: Vec2::new(font_scale, font_scale),
        ..Default::default()
    };
    draw_text(ctx, rect, text, &style, tint(color, dim), Alignment::Center, Alignment::Center);
}

/// Glyph-box text: one quad per non-whitespace code point, advanced by the
/// metric model, so extents and alignment match real measurement exactly.
fn draw_text(
    ctx: &mut RenderCtx,
    rect: Rect,
    text: &str,
    style: &TextStyle,
    color: Color,
    h_align: Alignment,
    v_align: Alignment,
) {
    if text.is_empty() || color.is_transparent() {
        return;
    }
    let lines = text::visible_lines(text, style.max_lines);
    let line_h = (text::LINE_HEIGHT + style.line_spacing) * style.font_scale.y;
    let block_h = line_h * lines.len() as f32;
    let glyph_h = text::GLYPH_SIZE * style.font_scale.y * 0.7;

    // VerticalLeft swaps axes at measurement; the box rendering keeps the
    // horizontal reading direction per line, which is close enough for a
    // preview of extents.
    let block_top = rect.origin.y + offset_in(v_align, rect.size.y, block_h);
    for (row, line) in lines.iter().enumerate() {
        let width = text::line_width(line, style);
        let mut x = rect.origin.x + offset_in(h_align, rect.size.x, width);
        let y = block_top + row as f32 * line_h + (line_h - glyph_h) * 0.5;
        for c in line.chars() {
            let advance = text::line_width(&c.to_string(), style);
            if !c.is_whitespace() {
                let w = (advance - 2.0).max(1.0);
                ctx.renderer.fill_rect(Rect::new(x + 1.0, y, w, glyph_h), color);
            }
            x += advance;
        }
    }
}

fn offset_in(align: Alignment, available: f32, content: f32) -> f32 {
    match align {
        Alignment::Near | Alignment::Stretch => 0.0,
        Alignment::Center => (available - content) * 0.5,
        Alignment::Far => available - content,
    }
}

// ── Textures ──────────────────────────────────────────────────────────────

/// Resolves a `{...}` reference through the atlas and asset bridge. Returns
/// the texture plus its UV window; `None` while the asset is pending or
/// after it failed, in which case callers fall back to flat color.
fn resolve_texture(
    ctx: &mut RenderCtx,
    reference: &str,
    linear: bool,
) -> Option<(TextureId, Rect)> {
    let sub = ctx.atlas.resolve(reference)?;
    match ctx.assets.request(&sub.path, ctx.now) {
        AssetState::Ready(id) => {
            let texture = ctx.renderer.texture_mut(id);
            texture.set_filter(if linear { FilterMode::Bilinear } else { FilterMode::Nearest });
            let (tw, th) = (texture.width() as f32, texture.height() as f32);
            let uv = match sub.region {
                Some(r) => Rect::new(r.x / tw, r.y / th, r.width / tw, r.height / th),
                None => Rect::new(0.0, 0.0, 1.0, 1.0),
            };
            Some((id, uv))
        }
        AssetState::Pending | AssetState::Failed => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_tree;
    use crate::layout::layout;
    use crate::style::StyleSheet;
    use craftkit_engine::render::Pixmap;
    use craftkit_markup::parse_str;

    fn render(src: &str, w: u32, h: u32) -> (Pixmap, usize) {
        let tree = build_tree(
            parse_str(src).unwrap().root,
            &StyleSheet::new(),
            &LanguageTable::default(),
        );
        let rects = layout(&tree, Rect::new(0.0, 0.0, w as f32, h as f32));
        let mut renderer = Renderer2d::new();
        let mut assets = AssetBridge::new();
        let atlas = AtlasCatalog::default();
        let language = LanguageTable::default();
        let mut ctx = RenderCtx {
            renderer: &mut renderer,
            assets: &mut assets,
            atlas: &atlas,
            language: &language,
            now: Instant::now(),
        };
        render_tree(&tree, &rects, &mut ctx);
        let mut pixmap = Pixmap::new(w, h);
        let calls = renderer.flush(Color::BLACK, &mut pixmap);
        (pixmap, calls)
    }

    #[test]
    fn rectangle_fills_its_rect() {
        let (pixmap, _) = render(
            r##"<CanvasWidget Size="Infinity,Infinity">
                <RectangleWidget Size="4,4" FillColor="#FF0000"
                    HorizontalAlignment="Near" VerticalAlignment="Near" />
            </CanvasWidget>"##,
            8,
            8,
        );
        assert_eq!(pixmap.pixel(1, 1), Color::opaque(255, 0, 0));
        assert_eq!(pixmap.pixel(6, 6), Color::BLACK);
    }

    #[test]
    fn flat_widgets_share_one_draw_call() {
        let (_, calls) = render(
            r##"<StackPanelWidget Size="Infinity,Infinity" Direction="Horizontal">
                <RectangleWidget Size="4,8" FillColor="#FF0000" />
                <RectangleWidget Size="4,8" FillColor="#00FF00" />
            </StackPanelWidget>"##,
            8,
            8,
        );
        assert_eq!(calls, 1);
    }

    #[test]
    fn disabled_subtree_renders_dimmed() {
        let (pixmap, _) = render(
            r#"<CanvasWidget Size="Infinity,Infinity" IsEnabled="false">
                <RectangleWidget Size="Infinity,Infinity" FillColor="255,0,0" />
            </CanvasWidget>"#,
            4,
            4,
        );
        assert_eq!(pixmap.pixel(1, 1), Color::opaque(153, 0, 0));
    }

    #[test]
    fn missing_texture_falls_back_to_flat_fill() {
        let (pixmap, _) = render(
            r##"<RectangleWidget Size="Infinity,Infinity"
                Subtexture="{Textures/Nope}" FillColor="#0000FF" />"##,
            4,
            4,
        );
        assert_eq!(pixmap.pixel(2, 2), Color::opaque(0, 0, 255));
    }
}

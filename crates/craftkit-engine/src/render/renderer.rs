use log::trace;

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::batch::{Batch, BatchKind};
use super::pixmap::Pixmap;
use super::texture::{Texture, TextureId};
use super::vertex::Vertex;

/// Accumulates draw commands into texture-keyed batches and rasterizes them.
///
/// Commands keep submission order: a new batch opens only when the bound
/// texture differs from the current batch's. Batch storage is pooled so a
/// steady frame allocates nothing.
#[derive(Debug, Default)]
pub struct Renderer2d {
    textures: Vec<Texture>,
    batches: Vec<Batch>,
    pool: Vec<Batch>,
    draw_calls: usize,
}

impl Renderer2d {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Textures ──────────────────────────────────────────────────────────

    pub fn create_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> &Texture {
        &self.textures[id.0]
    }

    pub fn texture_mut(&mut self, id: TextureId) -> &mut Texture {
        &mut self.textures[id.0]
    }

    // ── Command submission ────────────────────────────────────────────────

    /// Solid-color axis-aligned rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() || rect.normalized().is_empty() {
            return;
        }
        self.batch(BatchKind::Flat).mesh.push_rect(rect, color);
    }

    /// Arbitrary untextured quad (bevel trapezoids, split bar segments).
    pub fn fill_quad(&mut self, corners: [Vertex; 4]) {
        self.batch(BatchKind::Flat).mesh.push_quad(corners);
    }

    /// One-pixel rectangle outline, drawn as four line segments.
    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() {
            return;
        }
        let r = rect.normalized();
        let (min, max) = (r.min(), r.max());
        let corners = [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ];
        let lines = &mut self.batch(BatchKind::Flat).lines;
        for i in 0..4 {
            lines.push(Vertex::flat(corners[i], color));
            lines.push(Vertex::flat(corners[(i + 1) % 4], color));
        }
    }

    /// Textured quad: `dest` in logical pixels, `src_uv` in `[0, 1]` texture
    /// space, `tint` multiplied over every texel.
    pub fn draw_texture(&mut self, id: TextureId, dest: Rect, src_uv: Rect, tint: Color) {
        if tint.is_transparent() || dest.normalized().is_empty() {
            return;
        }
        let d = dest.normalized();
        let (dmin, dmax) = (d.min(), d.max());
        let (umin, umax) = (src_uv.min(), src_uv.max());
        self.batch(BatchKind::Textured(id)).mesh.push_quad([
            Vertex::textured(dmin, umin, tint),
            Vertex::textured(Vec2::new(dmax.x, dmin.y), Vec2::new(umax.x, umin.y), tint),
            Vertex::textured(dmax, umax, tint),
            Vertex::textured(Vec2::new(dmin.x, dmax.y), Vec2::new(umin.x, umax.y), tint),
        ]);
    }

    /// The open batch for `kind`, starting a new one on texture change.
    fn batch(&mut self, kind: BatchKind) -> &mut Batch {
        let need_new = match self.batches.last() {
            Some(last) => last.kind != kind,
            None => true,
        };
        if need_new {
            let mut batch = self.pool.pop().unwrap_or_else(|| Batch::new(kind));
            batch.reset(kind);
            self.batches.push(batch);
        }
        self.batches.last_mut().unwrap()
    }

    // ── Flush ─────────────────────────────────────────────────────────────

    /// Number of batches rasterized since construction. Exposed so tests can
    /// assert on batching behavior.
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    /// Batches queued for the next flush.
    pub fn pending_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_empty()).count()
    }

    /// Clears `target` and rasterizes every pending batch into it, in
    /// submission order. Returns the number of draw calls issued.
    pub fn flush(&mut self, clear: Color, target: &mut Pixmap) -> usize {
        target.clear(clear);
        let mut issued = 0;
        for mut batch in self.batches.drain(..) {
            if !batch.is_empty() {
                issued += 1;
                let texture = match batch.kind {
                    BatchKind::Flat => None,
                    BatchKind::Textured(id) => Some(&self.textures[id.0]),
                };
                for tri in batch.mesh.indices.chunks_exact(3) {
                    target.fill_triangle(
                        [
                            batch.mesh.vertices[tri[0] as usize],
                            batch.mesh.vertices[tri[1] as usize],
                            batch.mesh.vertices[tri[2] as usize],
                        ],
                        texture,
                    );
                }
                for line in batch.lines.chunks_exact(2) {
                    target.draw_line(line[0], line[1]);
                }
            }
            batch.reset(BatchKind::Flat);
            self.pool.push(batch);
        }
        self.draw_calls += issued;
        trace!("flushed {issued} draw calls");
        issued
    }
}

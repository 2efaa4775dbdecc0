use crate::coords::Rect;
use crate::paint::Color;

use super::texture::TextureId;
use super::vertex::Vertex;

// ── Mesh ──────────────────────────────────────────────────────────────────

/// Indexed triangle list.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Clears contents but keeps the allocations for the next frame.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Appends four vertices as two triangles (0-1-2, 0-2-3).
    pub fn push_quad(&mut self, corners: [Vertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Axis-aligned solid-color quad.
    pub fn push_rect(&mut self, rect: Rect, color: Color) {
        let r = rect.normalized();
        let (min, max) = (r.min(), r.max());
        self.push_quad([
            Vertex::flat(min, color),
            Vertex::flat(crate::coords::Vec2::new(max.x, min.y), color),
            Vertex::flat(max, color),
            Vertex::flat(crate::coords::Vec2::new(min.x, max.y), color),
        ]);
    }
}

// ── Batch ─────────────────────────────────────────────────────────────────

/// What a batch samples from. Flat batches additionally carry a line list
/// (bar outlines); textured batches never do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BatchKind {
    Flat,
    Textured(TextureId),
}

/// One draw call's worth of geometry.
#[derive(Debug, Clone)]
pub struct Batch {
    pub kind: BatchKind,
    pub mesh: Mesh,
    /// Line segments as vertex pairs. Only populated on flat batches.
    pub lines: Vec<Vertex>,
}

impl Batch {
    pub fn new(kind: BatchKind) -> Self {
        Self { kind, mesh: Mesh::default(), lines: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty() && self.lines.is_empty()
    }

    pub fn reset(&mut self, kind: BatchKind) {
        self.kind = kind;
        self.mesh.clear();
        self.lines.clear();
    }
}

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

/// One renderer vertex: position in logical pixels, texture coordinates in
/// `[0, 1]`, straight-alpha color.
///
/// `Pod` so batches can be uploaded or serialized as raw bytes without
/// per-vertex conversion.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// A vertex for untextured geometry. UV is unused by flat batches.
    #[inline]
    pub fn flat(pos: Vec2, color: Color) -> Self {
        Self {
            pos: [pos.x, pos.y],
            uv: [0.0, 0.0],
            color: color.to_f32_array(),
        }
    }

    #[inline]
    pub fn textured(pos: Vec2, uv: Vec2, tint: Color) -> Self {
        Self {
            pos: [pos.x, pos.y],
            uv: [uv.x, uv.y],
            color: tint.to_f32_array(),
        }
    }
}

use crate::paint::Color;

use super::texture::Texture;
use super::vertex::Vertex;

/// Software raster target: straight-alpha RGBA bytes, row-major, top-left
/// origin. The snapshot tool writes this straight out as a PNG.
#[derive(Debug, Clone)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y * self.width + x) * 4) as usize;
        Color::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// Source-over blend of a straight-alpha f32 color onto one pixel.
    fn blend(&mut self, x: i64, y: i64, src: [f32; 4]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let sa = src[3].clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        let da = self.data[i + 3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for ch in 0..3 {
            let dc = self.data[i + ch] as f32 / 255.0;
            let out = (src[ch].clamp(0.0, 1.0) * sa + dc * da * (1.0 - sa)) / out_a;
            self.data[i + ch] = (out * 255.0).round() as u8;
        }
        self.data[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Rasterizes one triangle with barycentric interpolation of color and UV
    /// at pixel centers. `texture` multiplies the interpolated vertex color.
    pub fn fill_triangle(&mut self, v: [Vertex; 3], texture: Option<&Texture>) {
        let area = edge(v[0].pos, v[1].pos, v[2].pos);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = v.iter().map(|p| p.pos[0]).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
        let min_y = v.iter().map(|p| p.pos[1]).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
        let max_x = (v.iter().map(|p| p.pos[0]).fold(f32::NEG_INFINITY, f32::max).ceil() as i64)
            .min(self.width as i64);
        let max_y = (v.iter().map(|p| p.pos[1]).fold(f32::NEG_INFINITY, f32::max).ceil() as i64)
            .min(self.height as i64);

        for py in min_y..max_y {
            for px in min_x..max_x {
                let p = [px as f32 + 0.5, py as f32 + 0.5];
                let w0 = edge(v[1].pos, v[2].pos, p) / area;
                let w1 = edge(v[2].pos, v[0].pos, p) / area;
                let w2 = edge(v[0].pos, v[1].pos, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let mut color = [0.0f32; 4];
                for ch in 0..4 {
                    color[ch] = w0 * v[0].color[ch] + w1 * v[1].color[ch] + w2 * v[2].color[ch];
                }
                if let Some(tex) = texture {
                    let u = w0 * v[0].uv[0] + w1 * v[1].uv[0] + w2 * v[2].uv[0];
                    let tv = w0 * v[0].uv[1] + w1 * v[1].uv[1] + w2 * v[2].uv[1];
                    let texel = tex.sample(u, tv);
                    for ch in 0..4 {
                        color[ch] *= texel[ch];
                    }
                }
                self.blend(px, py, color);
            }
        }
    }

    /// Draws a one-pixel line between two vertices. The color of the first
    /// vertex is used for the whole segment.
    pub fn draw_line(&mut self, a: Vertex, b: Vertex) {
        let dx = b.pos[0] - a.pos[0];
        let dy = b.pos[1] - a.pos[1];
        let steps = dx.abs().max(dy.abs()).ceil() as i32;
        if steps == 0 {
            self.blend(a.pos[0] as i64, a.pos[1] as i64, a.color);
            return;
        }
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = (a.pos[0] + dx * t).floor() as i64;
            let y = (a.pos[1] + dy * t).floor() as i64;
            self.blend(x, y, a.color);
        }
    }
}

#[inline]
fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    #[test]
    fn clear_fills_every_pixel() {
        let mut pm = Pixmap::new(4, 4);
        pm.clear(Color::opaque(10, 20, 30));
        assert_eq!(pm.pixel(0, 0), Color::opaque(10, 20, 30));
        assert_eq!(pm.pixel(3, 3), Color::opaque(10, 20, 30));
    }

    #[test]
    fn triangle_covers_pixel_centers_only() {
        let mut pm = Pixmap::new(8, 8);
        pm.clear(Color::BLACK);
        let red = Color::opaque(255, 0, 0);
        // Quad covering the left half as two triangles.
        let v = |x: f32, y: f32| Vertex::flat(Vec2::new(x, y), red);
        pm.fill_triangle([v(0.0, 0.0), v(4.0, 0.0), v(4.0, 8.0)], None);
        pm.fill_triangle([v(0.0, 0.0), v(4.0, 8.0), v(0.0, 8.0)], None);
        assert_eq!(pm.pixel(1, 1), red);
        assert_eq!(pm.pixel(3, 7), red);
        assert_eq!(pm.pixel(4, 1), Color::BLACK);
    }

    #[test]
    fn alpha_blends_source_over() {
        let mut pm = Pixmap::new(2, 2);
        pm.clear(Color::BLACK);
        let half_white = Color::new(255, 255, 255, 128);
        let v = |x: f32, y: f32| Vertex::flat(Vec2::new(x, y), half_white);
        pm.fill_triangle([v(0.0, 0.0), v(2.0, 0.0), v(2.0, 2.0)], None);
        pm.fill_triangle([v(0.0, 0.0), v(2.0, 2.0), v(0.0, 2.0)], None);
        let out = pm.pixel(0, 0);
        assert!(out.r > 120 && out.r < 135, "got {out:?}");
        assert_eq!(out.a, 255);
    }

    #[test]
    fn degenerate_triangle_is_skipped() {
        let mut pm = Pixmap::new(2, 2);
        let v = |x: f32, y: f32| Vertex::flat(Vec2::new(x, y), Color::WHITE);
        pm.fill_triangle([v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)], None);
        assert_eq!(pm.pixel(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn line_touches_endpoints() {
        let mut pm = Pixmap::new(4, 4);
        let red = Color::opaque(255, 0, 0);
        pm.draw_line(
            Vertex::flat(Vec2::new(0.5, 0.5), red),
            Vertex::flat(Vec2::new(3.5, 0.5), red),
        );
        assert_eq!(pm.pixel(0, 0), red);
        assert_eq!(pm.pixel(3, 0), red);
    }
}

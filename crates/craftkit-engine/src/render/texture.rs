// ── TextureId ─────────────────────────────────────────────────────────────

/// Handle into the renderer's texture table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

// ── FilterMode ────────────────────────────────────────────────────────────

/// Sampling filter. Pixel-art sources (the game's atlases) want `Nearest`;
/// photographic panoramas want `Bilinear`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Nearest,
    Bilinear,
}

// ── Texture ───────────────────────────────────────────────────────────────

/// CPU-side RGBA texture.
///
/// Pixels are replaced wholesale when the asset bridge delivers image data;
/// there is no partial-update path because assets arrive as whole files.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    filter: FilterMode,
}

impl Texture {
    /// A 1×1 white placeholder, used while an asset is still in flight.
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
            filter: FilterMode::Nearest,
        }
    }

    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        assert!(width > 0 && height > 0, "zero-sized texture");
        assert_eq!(rgba.len(), (width * height * 4) as usize, "pixel buffer size mismatch");
        Self { width, height, rgba, filter: FilterMode::Nearest }
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
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
    }

    /// Replaces the full pixel contents (and dimensions) of the texture.
    pub fn set_pixels(&mut self, width: u32, height: u32, rgba: Vec<u8>) {
        assert!(width > 0 && height > 0, "zero-sized texture");
        assert_eq!(rgba.len(), (width * height * 4) as usize, "pixel buffer size mismatch");
        self.width = width;
        self.height = height;
        self.rgba = rgba;
    }

    #[inline]
    fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.rgba[i] as f32 / 255.0,
            self.rgba[i + 1] as f32 / 255.0,
            self.rgba[i + 2] as f32 / 255.0,
            self.rgba[i + 3] as f32 / 255.0,
        ]
    }

    /// Samples at normalized `(u, v)`, clamped to the edge.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        match self.filter {
            FilterMode::Nearest => {
                let x = (u * self.width as f32).floor().max(0.0) as u32;
                let y = (v * self.height as f32).floor().max(0.0) as u32;
                self.texel(x, y)
            }
            FilterMode::Bilinear => {
                let fx = (u * self.width as f32 - 0.5).max(0.0);
                let fy = (v * self.height as f32 - 0.5).max(0.0);
                let x0 = fx.floor() as u32;
                let y0 = fy.floor() as u32;
                let tx = fx - fx.floor();
                let ty = fy - fy.floor();

                let c00 = self.texel(x0, y0);
                let c10 = self.texel(x0 + 1, y0);
                let c01 = self.texel(x0, y0 + 1);
                let c11 = self.texel(x0 + 1, y0 + 1);

                let mut out = [0.0; 4];
                for ch in 0..4 {
                    let top = c00[ch] + (c10[ch] - c00[ch]) * tx;
                    let bot = c01[ch] + (c11[ch] - c01[ch]) * tx;
                    out[ch] = top + (bot - top) * ty;
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker2x2() -> Texture {
        // white, black / black, white
        #[rustfmt::skip]
        let px = vec![
            255, 255, 255, 255,   0, 0, 0, 255,
            0, 0, 0, 255,         255, 255, 255, 255,
        ];
        Texture::new(2, 2, px)
    }

    #[test]
    fn nearest_picks_the_containing_texel() {
        let t = checker2x2();
        assert_eq!(t.sample(0.25, 0.25), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(t.sample(0.75, 0.25), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn bilinear_blends_at_texel_boundaries() {
        let mut t = checker2x2();
        t.set_filter(FilterMode::Bilinear);
        let mid = t.sample(0.5, 0.25);
        assert!((mid[0] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn sample_clamps_outside_range() {
        let t = checker2x2();
        assert_eq!(t.sample(2.0, 2.0), t.sample(0.99, 0.99));
    }

    #[test]
    fn set_pixels_replaces_dimensions() {
        let mut t = Texture::placeholder();
        t.set_pixels(2, 1, vec![0; 8]);
        assert_eq!((t.width(), t.height()), (2, 1));
    }
}

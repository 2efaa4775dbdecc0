//! Batched 2D renderer with a software raster target.
//!
//! Draw commands accumulate into batches in submission order; a new batch
//! starts only when the bound texture changes. [`Renderer2d::flush`] then
//! rasterizes every non-empty batch into a [`Pixmap`] in one pass each, so
//! the per-flush draw-call count equals the number of texture switches the
//! frame forced.

mod batch;
mod pixmap;
mod renderer;
mod texture;
mod vertex;

pub use batch::{Batch, BatchKind, Mesh};
pub use pixmap::Pixmap;
pub use renderer::Renderer2d;
pub use texture::{FilterMode, Texture, TextureId};
pub use vertex::Vertex;

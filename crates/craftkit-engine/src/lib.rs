//! Rendering and geometry support for the widget preview.
//!
//! This crate owns what the preview draws *with*: geometry types, the markup
//! color model, and a batched 2D renderer with a software raster target.
//! Widget semantics (attributes, styles, layout) live in `craftkit-preview`.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`coords`] | `Vec2`, `Rect` |
//! | [`paint`] | `Color` — the markup's straight-alpha RGBA model |
//! | [`render`] | `Renderer2d`, `Pixmap`, `Texture`, batching |
//! | [`logging`] | `env_logger` setup shared by the binaries |

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;

//! Color model used throughout the widget markup.
//!
//! Widget attributes express colors either as hex (`#RGB`, `#RGBA`,
//! `#RRGGBB`, `#RRGGBBAA`) or as decimal component lists (`R,G,B` or
//! `R,G,B,A`). Both forms resolve to straight-alpha RGBA bytes.

mod color;

pub use color::{Color, ColorParseError};

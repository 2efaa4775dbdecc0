use thiserror::Error;

use crate::style::StyleCycleError;

/// Failures surfaced by the preview pipeline.
///
/// Markup and style failures never abort a session: the session catches them
/// and renders an inline error panel instead. They exist as values so the
/// panel (and the snapshot tool's logs) can show what went wrong.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Parse(#[from] craftkit_markup::ParseError),

    #[error(transparent)]
    StyleCycle(#[from] StyleCycleError),

    #[error("image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("unknown asset request id {0}")]
    UnknownRequest(u64),
}

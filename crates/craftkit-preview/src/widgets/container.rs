use crate::attrs::{AttrMap, FlowDirection};

/// Shared by `StackPanelWidget` and `UniformSpacingPanelWidget`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StackPanelAttrs {
    pub direction: FlowDirection,
    /// Reverses child placement along the flow axis.
    pub is_inverted: bool,
}

impl StackPanelAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self {
            direction: attrs.flow("Direction"),
            is_inverted: attrs.bool("IsInverted", false),
        }
    }
}

/// `ScrollPanelWidget`. The preview does not scroll; the panel lays its
/// children out at natural size and clips to its bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScrollPanelAttrs {
    pub direction: FlowDirection,
}

impl ScrollPanelAttrs {
    pub fn from_attrs(attrs: &AttrMap) -> Self {
        Self { direction: attrs.flow("Direction") }
    }
}

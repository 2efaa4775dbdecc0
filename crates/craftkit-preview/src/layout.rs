//! Top-down rectangle resolution.
//!
//! Sizing (bottom-up, cached) already happened; this pass only places. Each
//! parent hands every child a slot, the child's alignment and margins decide
//! where inside the slot it lands.

use craftkit_engine::coords::{Rect, Vec2};

use crate::attrs::{Alignment, FlowDirection, SizeLength};
use crate::tree::{NodeId, WidgetTree};
use crate::widgets::WidgetKind;

/// Computes one rectangle per node, indexed by `NodeId`. Invisible subtrees
/// keep zero rects.
pub fn layout(tree: &WidgetTree, viewport: Rect) -> Vec<Rect> {
    let mut rects = vec![Rect::default(); tree.len()];
    if let Some(root) = tree.root() {
        let rect = place_in_slot(tree, root, viewport);
        rects[root.0] = rect;
        place_children(tree, root, rect, &mut rects);
    }
    rects
}

/// Concrete extent of a node on one axis, given the space its slot offers:
/// stretch fills, fixed stays, fit-content takes the derived cache.
fn concrete_len(declared: SizeLength, derived: f32, available: f32) -> f32 {
    match declared {
        SizeLength::Stretch => available,
        SizeLength::Fixed(n) => n,
        SizeLength::FitContent => derived.max(0.0),
    }
}

/// Position of a child extent inside a slot extent, per alignment.
fn align_offset(align: Alignment, slot: f32, child: f32) -> f32 {
    match align {
        Alignment::Near | Alignment::Stretch => 0.0,
        Alignment::Center => (slot - child) * 0.5,
        Alignment::Far => slot - child,
    }
}

/// Places one node inside its slot: margins inset the slot, then each axis
/// aligns independently. Absolute canvas positions bypass alignment.
fn place_in_slot(tree: &WidgetTree, id: NodeId, slot: Rect) -> Rect {
    let node = tree.node(id);
    let margin = node.base.margin;
    let inner = Rect::new(
        slot.origin.x + margin.x,
        slot.origin.y + margin.y,
        (slot.size.x - 2.0 * margin.x).max(0.0),
        (slot.size.y - 2.0 * margin.y).max(0.0),
    );

    let derived = tree.derived_size(id);
    let mut w = concrete_len(node.base.declared.0, derived.x, inner.size.x);
    let mut h = concrete_len(node.base.declared.1, derived.y, inner.size.y);
    if !w.is_finite() {
        w = inner.size.x;
    }
    if !h.is_finite() {
        h = inner.size.y;
    }

    let origin = match node.base.canvas_position {
        Some(pos) => inner.origin + pos,
        None => Vec2::new(
            inner.origin.x + align_offset(node.base.h_align, inner.size.x, w),
            inner.origin.y + align_offset(node.base.v_align, inner.size.y, h),
        ),
    };
    Rect::from_origin_size(origin, Vec2::new(w, h))
}

fn place_children(tree: &WidgetTree, id: NodeId, rect: Rect, rects: &mut Vec<Rect>) {
    let node = tree.node(id);
    let visible: Vec<NodeId> = node
        .children
        .iter()
        .copied()
        .filter(|&c| tree.node(c).base.is_visible)
        .collect();
    if visible.is_empty() {
        return;
    }

    match &node.kind {
        WidgetKind::StackPanel(attrs) => {
            stack_children(tree, &visible, rect, attrs.direction, attrs.is_inverted, false, rects)
        }
        WidgetKind::UniformSpacingPanel(attrs) => {
            stack_children(tree, &visible, rect, attrs.direction, attrs.is_inverted, true, rects)
        }
        WidgetKind::ScrollPanel(attrs) => {
            stack_children(tree, &visible, rect, attrs.direction, false, false, rects)
        }
        // Everything else gives each child the full content rect.
        _ => {
            for child in visible {
                let mut r = place_in_slot(tree, child, rect);
                if node.base.clamp_to_bounds {
                    r = r.intersect(rect).unwrap_or_default();
                }
                rects[child.0] = r;
                place_children(tree, child, r, rects);
            }
        }
    }

    if let WidgetKind::StackPanel(_) | WidgetKind::UniformSpacingPanel(_) | WidgetKind::ScrollPanel(_) =
        node.kind
    {
        let clamp = node.base.clamp_to_bounds;
        for &child in node.children.iter() {
            if !tree.node(child).base.is_visible {
                continue;
            }
            if clamp {
                rects[child.0] = rects[child.0].intersect(rect).unwrap_or_default();
            }
            place_children(tree, child, rects[child.0], rects);
        }
    }
}

/// Flow-axis placement shared by the three flow containers.
///
/// Fixed and fit-content children keep their extent (never shrunk); stretch
/// children split the leftover equally. With `uniform_spacing`, leftover
/// space becomes equal gaps around and between the children instead.
fn stack_children(
    tree: &WidgetTree,
    children: &[NodeId],
    rect: Rect,
    direction: FlowDirection,
    inverted: bool,
    uniform_spacing: bool,
    rects: &mut Vec<Rect>,
) {
    let horizontal = direction.is_horizontal();
    let flow_total = if horizontal { rect.size.x } else { rect.size.y };

    // First pass: concrete flow extents plus margins; count stretch children.
    let mut consumed = 0.0;
    let mut stretch_count = 0usize;
    let mut extents = Vec::with_capacity(children.len());
    for &child in children {
        let node = tree.node(child);
        let declared = if horizontal { node.base.declared.0 } else { node.base.declared.1 };
        let derived = tree.derived_size(child);
        let derived_flow = if horizontal { derived.x } else { derived.y };
        let margin = if horizontal { node.base.margin.x } else { node.base.margin.y };

        let ext = match declared {
            SizeLength::Stretch => {
                stretch_count += 1;
                f32::NAN // resolved below
            }
            SizeLength::Fixed(n) => n,
            SizeLength::FitContent => derived_flow.max(0.0),
        };
        if ext.is_finite() {
            consumed += ext + 2.0 * margin;
        } else {
            consumed += 2.0 * margin;
        }
        extents.push(ext);
    }

    let leftover = (flow_total - consumed).max(0.0);
    let stretch_each = if stretch_count > 0 { leftover / stretch_count as f32 } else { 0.0 };
    let gap = if uniform_spacing && stretch_count == 0 {
        leftover / (children.len() + 1) as f32
    } else {
        0.0
    };

    let order: Vec<usize> = if inverted {
        (0..children.len()).rev().collect()
    } else {
        (0..children.len()).collect()
    };

    let mut cursor = gap;
    for i in order {
        let child = children[i];
        let node = tree.node(child);
        let ext = if extents[i].is_nan() { stretch_each } else { extents[i] };
        let margin = node.base.margin;

        let slot = if horizontal {
            Rect::new(
                rect.origin.x + cursor,
                rect.origin.y,
                ext + 2.0 * margin.x,
                rect.size.y,
            )
        } else {
            Rect::new(
                rect.origin.x,
                rect.origin.y + cursor,
                rect.size.x,
                ext + 2.0 * margin.y,
            )
        };
        cursor += (if horizontal { slot.size.x } else { slot.size.y }) + gap;

        rects[child.0] = place_in_slot(tree, child, slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_tree;
    use crate::locale::LanguageTable;
    use crate::style::StyleSheet;
    use craftkit_markup::parse_str;

    fn layout_of(src: &str, w: f32, h: f32) -> (crate::tree::WidgetTree, Vec<Rect>) {
        let tree = build_tree(
            parse_str(src).unwrap().root,
            &StyleSheet::new(),
            &LanguageTable::default(),
        );
        let rects = layout(&tree, Rect::new(0.0, 0.0, w, h));
        (tree, rects)
    }

    #[test]
    fn stretch_root_fills_the_viewport() {
        let (_, rects) = layout_of(r#"<CanvasWidget Size="Infinity,Infinity" />"#, 320.0, 240.0);
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 320.0, 240.0));
    }

    #[test]
    fn canvas_child_centers() {
        let (_, rects) = layout_of(
            r#"<CanvasWidget Size="Infinity,Infinity">
                <RectangleWidget Size="100,50" HorizontalAlignment="Center" VerticalAlignment="Center" />
            </CanvasWidget>"#,
            300.0,
            150.0,
        );
        assert_eq!(rects[1], Rect::new(100.0, 50.0, 100.0, 50.0));
    }

    #[test]
    fn canvas_far_alignment_anchors_to_the_end() {
        let (_, rects) = layout_of(
            r#"<CanvasWidget Size="Infinity,Infinity">
                <RectangleWidget Size="100,50" HorizontalAlignment="Far" VerticalAlignment="Near" />
            </CanvasWidget>"#,
            300.0,
            150.0,
        );
        assert_eq!(rects[1], Rect::new(200.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn absolute_canvas_position_bypasses_alignment() {
        let (_, rects) = layout_of(
            r#"<CanvasWidget Size="Infinity,Infinity">
                <RectangleWidget Size="20,20" CanvasWidget.Position="33,44" HorizontalAlignment="Center" />
            </CanvasWidget>"#,
            300.0,
            150.0,
        );
        assert_eq!(rects[1].origin, Vec2::new(33.0, 44.0));
    }

    #[test]
    fn stack_places_children_in_flow_order() {
        let (_, rects) = layout_of(
            r#"<StackPanelWidget Size="Infinity,Infinity" Direction="Horizontal">
                <RectangleWidget Size="50,20" />
                <RectangleWidget Size="30,20" />
            </StackPanelWidget>"#,
            200.0,
            40.0,
        );
        assert_eq!(rects[1].origin.x, 0.0);
        assert_eq!(rects[2].origin.x, 50.0);
    }

    #[test]
    fn stack_stretch_children_split_leftover() {
        let (_, rects) = layout_of(
            r#"<StackPanelWidget Size="Infinity,Infinity" Direction="Horizontal">
                <RectangleWidget Size="40,20" />
                <RectangleWidget Size="Infinity,20" />
                <RectangleWidget Size="Infinity,20" />
            </StackPanelWidget>"#,
            200.0,
            40.0,
        );
        assert_eq!(rects[1].size.x, 40.0);
        assert_eq!(rects[2].size.x, 80.0);
        assert_eq!(rects[3].size.x, 80.0);
        assert_eq!(rects[3].origin.x, 120.0);
    }

    #[test]
    fn stack_fixed_children_do_not_shrink() {
        let (_, rects) = layout_of(
            r#"<StackPanelWidget Size="Infinity,Infinity" Direction="Horizontal">
                <RectangleWidget Size="150,20" />
                <RectangleWidget Size="150,20" />
            </StackPanelWidget>"#,
            200.0,
            40.0,
        );
        // Overflow is allowed; the second child starts past the first.
        assert_eq!(rects[1].size.x, 150.0);
        assert_eq!(rects[2].origin.x, 150.0);
        assert_eq!(rects[2].size.x, 150.0);
    }

    #[test]
    fn inverted_stack_reverses_placement() {
        let (_, rects) = layout_of(
            r#"<StackPanelWidget Size="Infinity,Infinity" Direction="Horizontal" IsInverted="true">
                <RectangleWidget Size="50,20" />
                <RectangleWidget Size="30,20" />
            </StackPanelWidget>"#,
            200.0,
            40.0,
        );
        assert_eq!(rects[2].origin.x, 0.0);
        assert_eq!(rects[1].origin.x, 30.0);
    }

    #[test]
    fn vertical_stack_flows_down() {
        let (_, rects) = layout_of(
            r#"<StackPanelWidget Size="Infinity,Infinity" Direction="Vertical">
                <RectangleWidget Size="20,50" />
                <RectangleWidget Size="20,30" />
            </StackPanelWidget>"#,
            40.0,
            200.0,
        );
        assert_eq!(rects[1].origin.y, 0.0);
        assert_eq!(rects[2].origin.y, 50.0);
    }

    #[test]
    fn uniform_spacing_spreads_leftover_evenly() {
        let (_, rects) = layout_of(
            r#"<UniformSpacingPanelWidget Size="Infinity,Infinity" Direction="Horizontal">
                <RectangleWidget Size="40,20" />
                <RectangleWidget Size="40,20" />
            </UniformSpacingPanelWidget>"#,
            200.0,
            40.0,
        );
        // 120 leftover over 3 gaps.
        assert_eq!(rects[1].origin.x, 40.0);
        assert_eq!(rects[2].origin.x, 120.0);
    }

    #[test]
    fn margins_inset_the_slot() {
        let (_, rects) = layout_of(
            r#"<CanvasWidget Size="Infinity,Infinity">
                <RectangleWidget Size="Infinity,Infinity" Margin="10,5" />
            </CanvasWidget>"#,
            100.0,
            60.0,
        );
        assert_eq!(rects[1], Rect::new(10.0, 5.0, 80.0, 50.0));
    }

    #[test]
    fn invisible_children_take_no_space() {
        let (_, rects) = layout_of(
            r#"<StackPanelWidget Size="Infinity,Infinity" Direction="Horizontal">
                <RectangleWidget Size="50,20" IsVisible="false" />
                <RectangleWidget Size="30,20" />
            </StackPanelWidget>"#,
            200.0,
            40.0,
        );
        assert_eq!(rects[1], Rect::default());
        assert_eq!(rects[2].origin.x, 0.0);
    }

    #[test]
    fn fit_content_label_gets_its_measured_size() {
        let (tree, rects) = layout_of(
            r#"<CanvasWidget Size="Infinity,Infinity">
                <LabelWidget Text="abcd" HorizontalAlignment="Near" VerticalAlignment="Near" />
            </CanvasWidget>"#,
            300.0,
            100.0,
        );
        let expected = tree.derived_size(crate::tree::NodeId(1));
        assert_eq!(rects[1].size, expected);
        assert_eq!(rects[1].size.x, 2.0 * crate::text::GLYPH_SIZE);
    }
}

//! Arena widget tree and reactive size propagation.
//!
//! Nodes live in one `Vec`; parents are non-owning indices. Each node caches
//! its derived (fit-content) extent; when a recomputation actually changes
//! the cache, the parent recomputes too, so a leaf resize walks at most once
//! up to the root and an unchanged recomputation stops immediately.

use craftkit_engine::coords::Vec2;
use craftkit_markup::Element;

use crate::attrs::{Alignment, AttrMap, SizeLength};
use crate::locale::LanguageTable;
use crate::widgets::{SizingModel, WidgetKind};

/// Sentinel for "no content contributes to this axis".
pub const NO_CONTENT: f32 = -1.0;

// ── NodeId ────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

// ── WidgetBase ────────────────────────────────────────────────────────────

/// Fields every widget carries, fully re-derived on each attribute update.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetBase {
    pub name: String,
    pub is_visible: bool,
    pub is_enabled: bool,
    /// Effective enabledness of the parent chain, pushed down on change.
    pub parent_enabled: bool,
    pub clamp_to_bounds: bool,
    /// Symmetric inset per axis: `x` on the left and right, `y` on top and
    /// bottom.
    pub margin: Vec2,
    pub h_align: Alignment,
    pub v_align: Alignment,
    pub declared: (SizeLength, SizeLength),
    /// Absolute placement inside a canvas parent.
    pub canvas_position: Option<Vec2>,
}

impl WidgetBase {
    pub fn from_attrs(attrs: &AttrMap, kind: &WidgetKind) -> Self {
        let declared = match attrs.get("Size") {
            Some(_) => attrs.size_pair("Size"),
            None => kind.default_declared_size().unwrap_or_default(),
        };
        let canvas_position = attrs
            .get("CanvasWidget.Position")
            .map(|_| attrs.pair("CanvasWidget.Position", Vec2::zero()));
        Self {
            name: attrs.string("Name", ""),
            is_visible: attrs.bool("IsVisible", true),
            is_enabled: attrs.bool("IsEnabled", true),
            parent_enabled: true,
            clamp_to_bounds: attrs.bool("ClampToBounds", kind.default_clamp_to_bounds()),
            margin: attrs.pair("Margin", Vec2::zero()),
            h_align: attrs.alignment("HorizontalAlignment"),
            v_align: attrs.alignment("VerticalAlignment"),
            declared,
            canvas_position,
        }
    }

    pub fn effective_enabled(&self) -> bool {
        self.is_enabled && self.parent_enabled
    }
}

// ── WidgetNode / WidgetTree ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetNode {
    pub base: WidgetBase,
    pub kind: WidgetKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Cached derived extent for fit-content axes; [`NO_CONTENT`] per axis
    /// when nothing contributes.
    derived: Vec2,
}

#[derive(Debug, Default)]
pub struct WidgetTree {
    nodes: Vec<WidgetNode>,
    root: Option<NodeId>,
    recomputes: usize,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &WidgetNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// How many derived-size recomputations have run. The propagation tests
    /// assert on this to pin the one-pass behavior.
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    /// Inserts a node, registering it with its parent. The first node
    /// inserted without a parent becomes the root.
    pub fn insert(&mut self, base: WidgetBase, kind: WidgetKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(WidgetNode {
            base,
            kind,
            parent,
            children: Vec::new(),
            derived: Vec2::new(NO_CONTENT, NO_CONTENT),
        });
        match parent {
            Some(p) => {
                let parent_enabled = self.nodes[p.0].base.effective_enabled();
                self.nodes[p.0].children.push(id);
                self.nodes[id.0].base.parent_enabled = parent_enabled;
            }
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }
        id
    }

    /// Detaches a node from its parent and recomputes the parent's size.
    /// The slot stays allocated; nothing re-indexes.
    pub fn remove(&mut self, id: NodeId, language: &LanguageTable) {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.update_size(parent, language);
    }

    // ── Attribute updates ─────────────────────────────────────────────────

    /// Fully re-derives a node's kind and base from an element's attributes.
    /// Absent attributes reset their fields, so update sequences are
    /// idempotent. Triggers upward size propagation when the node's
    /// effective extent changed.
    pub fn update_from_element(&mut self, id: NodeId, element: &Element, language: &LanguageTable) {
        let attrs = AttrMap::new(element);
        let kind = WidgetKind::from_attrs(&element.tag, &attrs);
        let mut base = WidgetBase::from_attrs(&attrs, &kind);
        base.parent_enabled = self.nodes[id.0].base.parent_enabled;

        let before = self.effective_size(id);
        let enabled_changed =
            base.effective_enabled() != self.nodes[id.0].base.effective_enabled();
        self.nodes[id.0].base = base;
        self.nodes[id.0].kind = kind;
        if enabled_changed {
            self.push_enabled_down(id);
        }

        self.update_size(id, language);

        // Derived changes already propagated through update_size; what is
        // left is an authoritative (Fixed/Stretch) change on an axis, which
        // the derived cache cannot see.
        let after = self.effective_size(id);
        let declared = self.nodes[id.0].base.declared;
        let auth_changed = (after.x != before.x && !declared.0.is_fit_content())
            || (after.y != before.y && !declared.1.is_fit_content());
        if auth_changed {
            if let Some(parent) = self.nodes[id.0].parent {
                self.update_size(parent, language);
            }
        }
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if self.nodes[id.0].base.is_enabled == enabled {
            return;
        }
        self.nodes[id.0].base.is_enabled = enabled;
        self.push_enabled_down(id);
    }

    fn push_enabled_down(&mut self, id: NodeId) {
        let effective = self.nodes[id.0].base.effective_enabled();
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.nodes[child.0].base.parent_enabled = effective;
            self.push_enabled_down(child);
        }
    }

    // ── Sizing ────────────────────────────────────────────────────────────

    /// The node's effective extent per axis: the declared length when it is
    /// authoritative (`Fixed`/`Stretch`, where `Stretch` is `INFINITY`), the
    /// derived cache otherwise ([`NO_CONTENT`] when empty).
    pub fn effective_size(&self, id: NodeId) -> Vec2 {
        let n = &self.nodes[id.0];
        Vec2::new(
            n.base.declared.0.authoritative().unwrap_or(n.derived.x),
            n.base.declared.1.authoritative().unwrap_or(n.derived.y),
        )
    }

    /// The derived (fit-content) cache.
    pub fn derived_size(&self, id: NodeId) -> Vec2 {
        self.nodes[id.0].derived
    }

    /// Recomputes the derived extent. Propagates to the parent only when the
    /// cache actually changed; the equality check is the termination guard.
    pub fn update_size(&mut self, id: NodeId, language: &LanguageTable) {
        self.recomputes += 1;
        let new = self.compute_derived(id, language);
        if self.nodes[id.0].derived == new {
            return;
        }
        self.nodes[id.0].derived = new;
        if let Some(parent) = self.nodes[id.0].parent {
            self.update_size(parent, language);
        }
    }

    /// Bottom-up recomputation of the whole tree, used once after building.
    pub fn update_all_sizes(&mut self, language: &LanguageTable) {
        if let Some(root) = self.root {
            self.update_sizes_post_order(root, language);
        }
    }

    fn update_sizes_post_order(&mut self, id: NodeId, language: &LanguageTable) {
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.update_sizes_post_order(child, language);
        }
        self.recomputes += 1;
        self.nodes[id.0].derived = self.compute_derived(id, language);
    }

    fn compute_derived(&self, id: NodeId, language: &LanguageTable) -> Vec2 {
        let node = &self.nodes[id.0];
        match node.kind.sizing() {
            SizingModel::Leaf => node
                .kind
                .intrinsic_size(language)
                .unwrap_or(Vec2::new(NO_CONTENT, NO_CONTENT)),
            SizingModel::CanvasLike => Vec2::new(
                self.max_child_extent(node, get_x, get_x),
                self.max_child_extent(node, get_y, get_y),
            ),
            SizingModel::StackLike(flow) => {
                let horizontal = flow.is_horizontal();
                let sum = self.sum_child_extent(node, horizontal);
                let cross = if horizontal {
                    self.max_child_extent(node, get_y, get_y)
                } else {
                    self.max_child_extent(node, get_x, get_x)
                };
                if horizontal {
                    Vec2::new(sum, cross)
                } else {
                    Vec2::new(cross, sum)
                }
            }
            SizingModel::UniformLike(flow) => {
                if flow.is_horizontal() {
                    Vec2::new(f32::INFINITY, self.max_child_extent(node, get_y, get_y))
                } else {
                    Vec2::new(self.max_child_extent(node, get_x, get_x), f32::INFINITY)
                }
            }
        }
    }

    /// Max child extent on one axis; `INFINITY` dominates, [`NO_CONTENT`]
    /// children are skipped, invisible children contribute nothing.
    fn max_child_extent(
        &self,
        node: &WidgetNode,
        axis: fn(Vec2) -> f32,
        margin_axis: fn(Vec2) -> f32,
    ) -> f32 {
        let mut result = NO_CONTENT;
        for &child in &node.children {
            let c = &self.nodes[child.0];
            if !c.base.is_visible {
                continue;
            }
            let ext = axis(self.effective_size(child));
            if ext < 0.0 {
                continue;
            }
            result = result.max(ext + 2.0 * margin_axis(c.base.margin));
        }
        result
    }

    /// Sum of positive child extents along the flow axis; `INFINITY`
    /// short-circuits.
    fn sum_child_extent(&self, node: &WidgetNode, horizontal: bool) -> f32 {
        let mut sum = NO_CONTENT;
        for &child in &node.children {
            let c = &self.nodes[child.0];
            if !c.base.is_visible {
                continue;
            }
            let size = self.effective_size(child);
            let (ext, margin) = if horizontal {
                (size.x, c.base.margin.x)
            } else {
                (size.y, c.base.margin.y)
            };
            if ext < 0.0 {
                continue;
            }
            if ext.is_infinite() {
                return f32::INFINITY;
            }
            sum = sum.max(0.0) + ext + 2.0 * margin;
        }
        sum
    }
}

fn get_x(v: Vec2) -> f32 {
    v.x
}

fn get_y(v: Vec2) -> f32 {
    v.y
}

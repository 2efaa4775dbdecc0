//! Widget-tree construction from a styled element tree.

use craftkit_markup::Element;

use crate::attrs::AttrMap;
use crate::locale::LanguageTable;
use crate::style::{flatten_button_parts, StyleSheet};
use crate::tree::{NodeId, WidgetBase, WidgetTree};
use crate::widgets::WidgetKind;

/// Builds a widget tree from a parsed document root.
///
/// The element tree is consumed as scratch space: styles are merged into it
/// and composite buttons flatten their part children before instantiation.
/// Because all mutation happens here, a failed compile leaves no
/// half-applied state behind in the session.
pub fn build_tree(mut root: Element, sheet: &StyleSheet, language: &LanguageTable) -> WidgetTree {
    let mut tree = WidgetTree::new();
    sheet.apply_tree(&mut root);
    instantiate(&mut tree, &root, None);
    tree.update_all_sizes(language);
    tree
}

fn instantiate(tree: &mut WidgetTree, element: &Element, parent: Option<NodeId>) -> NodeId {
    let mut element = element.clone();
    flatten_button_parts(&mut element);

    let attrs = AttrMap::new(&element);
    let kind = WidgetKind::from_attrs(&element.tag, &attrs);
    if matches!(kind, WidgetKind::Unknown { .. }) {
        log::debug!("unknown widget tag <{}>", element.tag);
    }
    let base = WidgetBase::from_attrs(&attrs, &kind);
    let id = tree.insert(base, kind, parent);

    for child in &element.children {
        instantiate(tree, child, Some(id));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::SizeLength;
    use crate::style::Style;
    use craftkit_markup::parse_str;

    fn build(src: &str) -> WidgetTree {
        build_tree(
            parse_str(src).unwrap().root,
            &StyleSheet::new(),
            &LanguageTable::default(),
        )
    }

    #[test]
    fn nested_markup_builds_matching_tree() {
        let tree = build(
            r#"<CanvasWidget Size="160,40">
                <StackPanelWidget Direction="Vertical">
                    <LabelWidget Text="a" />
                    <LabelWidget Text="b" />
                </StackPanelWidget>
            </CanvasWidget>"#,
        );
        let root = tree.root().unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.node(root).children.len(), 1);
        assert_eq!(tree.effective_size(root).x, 160.0);
    }

    #[test]
    fn unknown_tags_become_placeholders() {
        let tree = build(r#"<FancyNewWidget Size="10,10" />"#);
        let root = tree.root().unwrap();
        assert_eq!(
            tree.node(root).kind,
            WidgetKind::Unknown { original_tag: "FancyNewWidget".to_string() }
        );
    }

    #[test]
    fn rectangle_defaults_to_stretch_without_size() {
        let tree = build(r##"<RectangleWidget FillColor="#333333" />"##);
        let root = tree.root().unwrap();
        assert_eq!(
            tree.node(root).base.declared,
            (SizeLength::Stretch, SizeLength::Stretch)
        );
    }

    #[test]
    fn button_parts_from_styles_reach_the_widget() {
        let mut sheet = StyleSheet::new();
        sheet.insert(Style::new(
            "Fancy",
            parse_str(
                r##"<BevelledButtonWidget BevelColor="#606060">
                    <LabelWidget Name="BevelledButton.Label" Color="#FFFF00" />
                </BevelledButtonWidget>"##,
            )
            .unwrap()
            .root,
        ));
        sheet.cook().unwrap();

        let tree = build_tree(
            parse_str(r#"<BevelledButtonWidget Style="Fancy" Text="OK" />"#).unwrap().root,
            &sheet,
            &LanguageTable::default(),
        );
        let root = tree.root().unwrap();
        // The part child was flattened away, not instantiated.
        assert_eq!(tree.node(root).children.len(), 0);
        match &tree.node(root).kind {
            WidgetKind::BevelledButton(attrs) => {
                assert_eq!(attrs.button.part_attr("Label", "Color"), Some("#FFFF00"));
                assert_eq!(attrs.button.text, "OK");
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}

//! Lexer, parser, and element tree for the game's XML content markup.
//!
//! The same element model covers widget-description documents (`.wgt`),
//! database files (`.xdb`) and crafting-recipe files (`.cr`), so this crate
//! is intentionally dependency-free: language-server tooling, editors, and
//! the preview renderer all consume it without pulling in any render code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`element`] | `Document`, `Element`, `Attr` |
//! | [`error`] | `ParseError` |
//! | [`lexer`] | `Cursor` — low-level scanning with line/col tracking |
//! | [`parser`] | `parse_str` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use craftkit_markup::parse_str;
//!
//! let src = r#"
//!     <CanvasWidget Size="160,40">
//!         <LabelWidget Text="Hello" Color="255,255,255" />
//!     </CanvasWidget>
//! "#;
//!
//! let doc = parse_str(src).unwrap();
//! assert_eq!(doc.root.tag, "CanvasWidget");
//! assert_eq!(doc.root.children[0].attr("Text"), Some("Hello"));
//! ```

pub mod element;
pub mod error;
pub mod lexer;
pub mod parser;

pub use element::{Attr, Document, Element};
pub use error::ParseError;
pub use parser::parse_str;

#[cfg(test)]
mod parse_tests {
    use super::*;

    fn ok(src: &str) -> Document { parse_str(src).unwrap() }
    fn err(src: &str) { parse_str(src).unwrap_err(); }

    #[test] fn empty_element() { ok("<CanvasWidget />"); }
    #[test] fn empty_element_with_close_tag() { ok("<CanvasWidget></CanvasWidget>"); }
    #[test] fn nested_elements() {
        let doc = ok(r##"<StackPanelWidget Direction="Vertical">
            <RectangleWidget FillColor="#108C00" />
            <LabelWidget Text="hi" />
        </StackPanelWidget>"##);
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.attr("Direction"), Some("Vertical"));
    }
    #[test] fn attribute_order_preserved() {
        let doc = ok(r#"<Widget B="2" A="1" C="3" />"#);
        let names: Vec<&str> = doc.root.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }
    #[test] fn xml_prolog_and_comment() {
        ok("<?xml version=\"1.0\"?>\n<!-- header -->\n<Widget><!-- body --></Widget>");
    }
    #[test] fn entities_decoded() {
        let doc = ok(r#"<Widget Text="a &lt;b&gt; &amp; &quot;c&quot; &#65;" />"#);
        assert_eq!(doc.root.attr("Text"), Some("a <b> & \"c\" A"));
    }
    #[test] fn single_quoted_attribute() {
        let doc = ok("<Widget Name='Panel' />");
        assert_eq!(doc.root.name(), Some("Panel"));
    }
    #[test] fn text_content_skipped() {
        let doc = ok("<Widget>some text<Child />more</Widget>");
        assert_eq!(doc.root.children.len(), 1);
    }
    #[test] fn error_position_reported() {
        let e = parse_str("<Widget\n  Bad>").unwrap_err();
        assert_eq!(e.line, 2);
    }
    #[test] fn err_mismatched_close() { err("<A><B></A></B>"); }
    #[test] fn err_unterminated_value() { err(r#"<Widget Name="oops />"#); }
    #[test] fn err_missing_equals() { err(r#"<Widget Name "x" />"#); }
    #[test] fn err_missing_close() { err("<Widget><Child /></Widge"); }
    #[test] fn err_trailing_content() { err("<A /><B />"); }
    #[test] fn err_unknown_entity() { err(r#"<Widget Text="&bogus;" />"#); }

    #[test]
    fn set_attr_replaces_or_appends() {
        let mut el = Element::new("Widget");
        el.set_attr("Size", "1,2");
        el.set_attr("Size", "3,4");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attr("Size"), Some("3,4"));
    }

    #[test]
    fn named_child_lookup() {
        let doc = ok(r#"<Widget><Child Name="A" /><Child Name="B" Tag="x" /></Widget>"#);
        assert_eq!(doc.root.named_child("B").unwrap().attr("Tag"), Some("x"));
        assert!(doc.root.named_child("C").is_none());
    }
}

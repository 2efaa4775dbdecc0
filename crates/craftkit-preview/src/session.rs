//! Preview session: host messages in, pixels out.
//!
//! Single-threaded and synchronous: every state change happens inside
//! [`PreviewSession::handle_message`] or [`PreviewSession::render`].
//! Compilation (style cook, merge, tree build) runs on a scratch clone of
//! the parsed document, so a failed compile leaves no partial state — the
//! next render simply shows the error panel.

use std::collections::HashMap;
use std::time::Instant;

use craftkit_engine::coords::{Rect, Vec2};
use craftkit_engine::paint::Color;
use craftkit_engine::render::{Pixmap, Renderer2d};
use craftkit_markup::{parse_str, Element};

use crate::assets::{AssetBridge, AtlasCatalog};
use crate::builder::build_tree;
use crate::error::PreviewError;
use crate::layout::layout;
use crate::locale::LanguageTable;
use crate::protocol::{HostMessage, HostReport, PreviewMessage};
use crate::render::{render_tree, RenderCtx};
use crate::style::{Style, StyleSheet};

const BACKDROP: Color = Color::opaque(0x10, 0x10, 0x14);

#[derive(Debug, Default)]
struct InitState {
    languages_seen: bool,
    widget_seen: bool,
    announced: bool,
}

pub struct PreviewSession {
    sheet: StyleSheet,
    language: LanguageTable,
    language_names: Vec<String>,
    atlas: AtlasCatalog,
    assets: AssetBridge,
    renderer: Renderer2d,
    title: String,
    document: Option<Result<Element, PreviewError>>,
    outgoing: Vec<PreviewMessage>,
    init: InitState,
}

impl PreviewSession {
    pub fn new() -> Self {
        let mut session = Self {
            sheet: StyleSheet::new(),
            language: LanguageTable::default(),
            language_names: Vec::new(),
            atlas: AtlasCatalog::default(),
            assets: AssetBridge::new(),
            renderer: Renderer2d::new(),
            title: String::new(),
            document: None,
            outgoing: Vec::new(),
            init: InitState::default(),
        };
        session.outgoing.push(PreviewMessage::WebviewInitialized);
        session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn language_names(&self) -> &[String] {
        &self.language_names
    }

    // ── Host messages ─────────────────────────────────────────────────────

    pub fn handle_message(&mut self, message: HostMessage) {
        match message {
            HostMessage::LanguageNames { names, selected } => {
                self.language_names = names;
                let pick = selected.or_else(|| self.language_names.first().cloned());
                if let Some(language) = pick {
                    self.outgoing
                        .push(PreviewMessage::RequestLanguageStrings { language });
                }
                self.init.languages_seen = true;
            }
            HostMessage::LanguageStrings { language, strings } => {
                self.language = LanguageTable::new(language, strings);
            }
            HostMessage::AtlasDefinition { texture, entries } => {
                self.atlas = AtlasCatalog { texture_path: Some(texture), entries };
            }
            HostMessage::WidgetToPreview { title, markup, styles } => {
                self.title = title;
                self.load_styles(styles);
                self.document = Some(parse_str(&markup).map(|doc| doc.root).map_err(PreviewError::from));
                self.init.widget_seen = true;
            }
            HostMessage::ImageFile { request_id, bytes } => {
                if let Err(e) = self.assets.deliver(request_id, &bytes, &mut self.renderer) {
                    log::warn!("image delivery rejected: {e}");
                    self.assets.fail(request_id);
                }
            }
            HostMessage::AudioFile { request_id } => {
                log::debug!("ignoring audio delivery for request {request_id}");
            }
            HostMessage::Report { report, request_id } => match report {
                HostReport::GetFileFailed => {
                    if let Some(id) = request_id {
                        self.assets.fail(id);
                    }
                }
                HostReport::NoLanguageNames | HostReport::NoLanguageStrings => {
                    log::warn!("host reported missing language data: {report:?}");
                    self.init.languages_seen = true;
                }
            },
        }

        if self.init.languages_seen && self.init.widget_seen && !self.init.announced {
            self.init.announced = true;
            self.outgoing.push(PreviewMessage::AllInitialized);
        }
    }

    fn load_styles(&mut self, styles: HashMap<String, String>) {
        self.sheet.clear();
        for (name, markup) in styles {
            match parse_str(&markup) {
                Ok(doc) => self.sheet.insert(Style::new(name, doc.root)),
                Err(e) => log::warn!("style {name:?} failed to parse: {e}"),
            }
        }
    }

    /// Messages queued for the host (session plus asset bridge).
    pub fn poll_outgoing(&mut self) -> Vec<PreviewMessage> {
        let mut messages = std::mem::take(&mut self.outgoing);
        messages.extend(self.assets.take_outgoing());
        messages
    }

    /// Expires stale asset requests.
    pub fn tick(&mut self, now: Instant) {
        self.assets.tick(now);
    }

    /// Drops pending asset requests and caches; the session can still be fed
    /// a new widget afterwards.
    pub fn teardown(&mut self) {
        self.assets.teardown();
        self.sheet.clear();
        self.document = None;
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    /// Renders the current document into a fresh pixmap.
    ///
    /// Markup and style failures render an inline error panel; this method
    /// itself never fails.
    pub fn render(&mut self, viewport: Vec2) -> Pixmap {
        let root = self.compile();
        let tree = build_tree(root, &self.sheet, &self.language);
        let rects = layout(&tree, Rect::from_origin_size(Vec2::zero(), viewport));

        let mut ctx = RenderCtx {
            renderer: &mut self.renderer,
            assets: &mut self.assets,
            atlas: &self.atlas,
            language: &self.language,
            now: Instant::now(),
        };
        render_tree(&tree, &rects, &mut ctx);

        let mut pixmap = Pixmap::new(viewport.x.max(1.0) as u32, viewport.y.max(1.0) as u32);
        self.renderer.flush(BACKDROP, &mut pixmap);
        pixmap
    }

    /// The scratch element tree for this frame: the parsed document when
    /// everything compiled, the error panel otherwise.
    fn compile(&mut self) -> Element {
        let parsed = match &self.document {
            None => return error_panel(&self.title, "waiting for a widget"),
            Some(Err(e)) => return error_panel(&self.title, &e.to_string()),
            Some(Ok(root)) => root.clone(),
        };
        if let Err(cycle) = self.sheet.cook() {
            return error_panel(&self.title, &cycle.to_string());
        }
        parsed
    }
}

impl Default for PreviewSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A small self-contained widget tree showing what went wrong, built without
/// touching the style sheet.
fn error_panel(title: &str, message: &str) -> Element {
    let mut root = Element::new("CanvasWidget");
    root.set_attr("Size", "Infinity,Infinity");

    let mut panel = Element::new("BevelledRectangleWidget");
    panel.set_attr("CenterColor", "#401818");
    panel.set_attr("BevelColor", "#802020");

    let mut stack = Element::new("StackPanelWidget");
    stack.set_attr("Direction", "Vertical");
    stack.set_attr("HorizontalAlignment", "Center");
    stack.set_attr("VerticalAlignment", "Center");

    let mut heading = Element::new("FontTextWidget");
    heading.set_attr("Text", if title.is_empty() { "preview error" } else { title });
    heading.set_attr("Color", "#FFFFFF");

    let mut body = Element::new("FontTextWidget");
    body.set_attr("Text", message);
    body.set_attr("Color", "#FFB0B0");
    body.set_attr("MaxLines", "4");

    stack.children.push(heading);
    stack.children.push(body);
    root.children.push(panel);
    root.children.push(stack);
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_message(markup: &str) -> HostMessage {
        HostMessage::WidgetToPreview {
            title: "Test.wgt".to_string(),
            markup: markup.to_string(),
            styles: HashMap::new(),
        }
    }

    #[test]
    fn announces_initialization_once() {
        let mut session = PreviewSession::new();
        assert_eq!(session.poll_outgoing(), vec![PreviewMessage::WebviewInitialized]);

        session.handle_message(HostMessage::LanguageNames {
            names: vec!["English".to_string()],
            selected: None,
        });
        session.handle_message(widget_message("<CanvasWidget />"));

        let out = session.poll_outgoing();
        assert!(out.contains(&PreviewMessage::AllInitialized));
        assert!(out.contains(&PreviewMessage::RequestLanguageStrings {
            language: "English".to_string()
        }));

        session.handle_message(widget_message("<CanvasWidget />"));
        assert!(!session.poll_outgoing().contains(&PreviewMessage::AllInitialized));
    }

    #[test]
    fn renders_a_simple_widget() {
        let mut session = PreviewSession::new();
        session.handle_message(widget_message(
            r##"<RectangleWidget Size="Infinity,Infinity" FillColor="#108C00" />"##,
        ));
        let pixmap = session.render(Vec2::new(8.0, 8.0));
        assert_eq!(pixmap.pixel(4, 4), Color::opaque(0x10, 0x8C, 0x00));
    }

    #[test]
    fn parse_failure_renders_the_error_panel() {
        let mut session = PreviewSession::new();
        session.handle_message(widget_message("<CanvasWidget><Broken></CanvasWidget>"));
        let pixmap = session.render(Vec2::new(64.0, 64.0));
        // The panel's bevel chrome is visible instead of a blank backdrop.
        assert_ne!(pixmap.pixel(32, 32), BACKDROP);
    }

    #[test]
    fn style_cycle_renders_the_error_panel_and_recovers() {
        let mut session = PreviewSession::new();
        let mut styles = HashMap::new();
        styles.insert(
            "A".to_string(),
            r#"<CanvasWidget><CanvasWidget Style="B" /></CanvasWidget>"#.to_string(),
        );
        styles.insert(
            "B".to_string(),
            r#"<CanvasWidget><CanvasWidget Style="A" /></CanvasWidget>"#.to_string(),
        );
        session.handle_message(HostMessage::WidgetToPreview {
            title: "Cyclic.wgt".to_string(),
            markup: r#"<CanvasWidget Style="A" />"#.to_string(),
            styles,
        });
        let pixmap = session.render(Vec2::new(64.0, 64.0));
        assert_ne!(pixmap.pixel(32, 32), BACKDROP);

        // A good widget afterwards renders normally.
        session.handle_message(widget_message(
            r##"<RectangleWidget Size="Infinity,Infinity" FillColor="#0000FF" />"##,
        ));
        let pixmap = session.render(Vec2::new(8.0, 8.0));
        assert_eq!(pixmap.pixel(4, 4), Color::opaque(0, 0, 255));
    }

    #[test]
    fn image_request_flows_through_the_protocol() {
        let mut session = PreviewSession::new();
        session.handle_message(widget_message(
            r#"<RectangleWidget Size="Infinity,Infinity" Subtexture="{Textures/Gui/B}" />"#,
        ));
        session.render(Vec2::new(8.0, 8.0));

        let out = session.poll_outgoing();
        assert!(out
            .iter()
            .any(|m| matches!(m, PreviewMessage::RequestImageFile { path, .. } if path == "Textures/Gui/B")));
    }
}

//! Live preview for the game's widget markup.
//!
//! Feed it the markup, styles, language tables and textures an editor host
//! has; get back pixels. The pipeline per frame:
//!
//! ```text
//! markup ──parse──► element tree ──cook/apply styles──► widget tree
//!        ──layout──► rects ──paint──► renderer batches ──flush──► Pixmap
//! ```
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`attrs`] | typed attribute access, `SizeLength`, `Alignment` |
//! | [`style`] | style cooking, first-wins merge, part flattening |
//! | [`tree`] | arena widget tree, reactive size propagation |
//! | [`widgets`] | concrete widget kinds and their attributes |
//! | [`layout`] | top-down rect resolution |
//! | [`render`] | paint pass over the batched renderer |
//! | [`text`] | the game's text metric model |
//! | [`locale`] | language tables, `[group:id]` references |
//! | [`assets`] | host-backed texture requests, atlas catalog |
//! | [`protocol`] | host ⇄ preview JSON messages |
//! | [`session`] | [`PreviewSession`] tying it all together |
//!
//! # Quick start
//!
//! ```rust
//! use craftkit_engine::coords::Vec2;
//! use craftkit_preview::protocol::HostMessage;
//! use craftkit_preview::session::PreviewSession;
//!
//! let mut session = PreviewSession::new();
//! session.handle_message(HostMessage::WidgetToPreview {
//!     title: "Hello.wgt".into(),
//!     markup: r##"<CanvasWidget Size="Infinity,Infinity">
//!         <LabelWidget Text="Hello" Color="#FFFFFF" />
//!     </CanvasWidget>"##.into(),
//!     styles: Default::default(),
//! });
//! let pixmap = session.render(Vec2::new(320.0, 240.0));
//! assert_eq!(pixmap.width(), 320);
//! ```

pub mod assets;
pub mod attrs;
pub mod builder;
pub mod error;
pub mod layout;
pub mod locale;
pub mod protocol;
pub mod render;
pub mod session;
pub mod style;
pub mod text;
pub mod tree;
pub mod widgets;

pub use error::PreviewError;
pub use session::PreviewSession;

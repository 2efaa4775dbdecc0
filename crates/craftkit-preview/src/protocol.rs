//! Host ⇄ preview message protocol.
//!
//! JSON messages tagged by `type`. The host side owns the files (markup,
//! styles, textures, language tables); the preview side owns rendering and
//! asks for what it needs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assets::AtlasRect;

// ── Host → preview ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    /// Available language names plus the one currently selected.
    LanguageNames {
        names: Vec<String>,
        #[serde(default)]
        selected: Option<String>,
    },
    /// String tables for one language: group → id → text.
    LanguageStrings {
        language: String,
        strings: HashMap<String, HashMap<String, String>>,
    },
    /// The shared texture atlas: backing image path and named regions.
    AtlasDefinition {
        texture: String,
        entries: HashMap<String, AtlasRect>,
    },
    /// A widget document (with its styles) to render.
    WidgetToPreview {
        title: String,
        markup: String,
        #[serde(default)]
        styles: HashMap<String, String>,
    },
    /// Bytes answering a `request:imageFile`.
    ImageFile { request_id: u64, bytes: Vec<u8> },
    /// Bytes answering an audio request. The preview acknowledges but does
    /// not play audio.
    AudioFile { request_id: u64 },
    /// Host-side failure notices.
    Report {
        report: HostReport,
        #[serde(default)]
        request_id: Option<u64>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostReport {
    GetFileFailed,
    NoLanguageNames,
    NoLanguageStrings,
}

// ── Preview → host ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PreviewMessage {
    /// The preview is up and can receive messages.
    WebviewInitialized,
    /// Languages and a widget have arrived; first render happened.
    AllInitialized,
    RequestLanguageStrings { language: String },
    RequestWidgetToPreview,
    RequestImageFile { path: String, request_id: u64 },
}

//! LSP backend: document store, GUID index, diagnostics, navigation, and
//! quick fixes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::diagnostics;
use crate::index::{fresh_guid, GuidIndex, TagSite};
use crate::recipes;
use crate::scan::{self, FileClass};

// ── Backend ───────────────────────────────────────────────────────────────────

pub struct Backend {
    client: Client,
    docs: Arc<RwLock<HashMap<Url, String>>>,
    index: Arc<RwLock<GuidIndex>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            docs: Arc::new(RwLock::new(HashMap::new())),
            index: Arc::new(RwLock::new(GuidIndex::new())),
        }
    }

    async fn update(&self, uri: Url, text: String) {
        let class = FileClass::of(uri.path());
        let published = {
            let mut index = self.index.write().await;
            if class == FileClass::Database {
                index.scan_document(&uri, &text);
            }
            diagnostics::for_document(&uri, class, &text, &index)
        };
        self.client
            .publish_diagnostics(uri.clone(), published, None)
            .await;
        self.docs.write().await.insert(uri, text);
    }
}

// ── LanguageServer impl ───────────────────────────────────────────────────────

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["\"".to_string(), " ".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "craftkit-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "craftkit-lsp ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    // ── Document lifecycle ────────────────────────────────────────────────────

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.update(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We request FULL sync, so there's always exactly one change entry.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.update(params.text_document.uri, change.text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.docs.write().await.remove(&uri);
        self.index.write().await.remove_document(&uri);
    }

    // ── Hover ─────────────────────────────────────────────────────────────────

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let pos = &params.text_document_position_params.position;

        let docs = self.docs.read().await;
        let text = match docs.get(uri) {
            Some(t) => t,
            None => return Ok(None),
        };
        let (guid, range) = match scan::guid_at(text, pos) {
            Some(hit) => hit,
            None => return Ok(None),
        };

        let index = self.index.read().await;
        let defs = index.definitions(&guid);
        if defs.is_empty() {
            return Ok(None);
        }

        let mut lines = vec!["Defined by:".to_string()];
        lines.extend(defs.iter().map(site_line));
        let refs = index.references(&guid);
        if !refs.is_empty() {
            lines.push(format!("Referenced by {} tag(s).", refs.len()));
        }

        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: lines.join("\n\n"),
            }),
            range: Some(range),
        }))
    }

    // ── Navigation ────────────────────────────────────────────────────────────

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let pos = &params.text_document_position_params.position;

        let docs = self.docs.read().await;
        let Some(text) = docs.get(uri) else {
            return Ok(None);
        };
        let Some((guid, _)) = scan::guid_at(text, pos) else {
            return Ok(None);
        };

        let index = self.index.read().await;
        let locations: Vec<Location> = index.definitions(&guid).iter().map(location).collect();
        if locations.is_empty() {
            return Ok(None);
        }
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let pos = &params.text_document_position.position;

        let docs = self.docs.read().await;
        let Some(text) = docs.get(uri) else {
            return Ok(None);
        };
        let Some((guid, _)) = scan::guid_at(text, pos) else {
            return Ok(None);
        };

        let index = self.index.read().await;
        let mut locations = Vec::new();
        if params.context.include_declaration {
            locations.extend(index.definitions(&guid).iter().map(location));
        }
        locations.extend(index.references(&guid).iter().map(location));
        if locations.is_empty() {
            return Ok(None);
        }
        Ok(Some(locations))
    }

    // ── Completion ────────────────────────────────────────────────────────────

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let pos = &params.text_document_position.position;

        if FileClass::of(uri.path()) != FileClass::Recipes {
            return Ok(None);
        }
        let docs = self.docs.read().await;
        let Some(text) = docs.get(uri) else {
            return Ok(None);
        };
        let Some(ingredients) = recipes::ingredients_at(text, pos.line as usize) else {
            return Ok(None);
        };

        let items = ingredients
            .into_iter()
            .map(|ingredient| {
                let mut item = CompletionItem::new_simple(
                    ingredient.letter.to_string(),
                    ingredient.value,
                );
                item.kind = Some(CompletionItemKind::VALUE);
                item
            })
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    // ── Quick fixes ───────────────────────────────────────────────────────────

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let class = FileClass::of(uri.path());

        let docs = self.docs.read().await;
        let Some(text) = docs.get(&uri) else {
            return Ok(None);
        };

        let mut actions = Vec::new();
        for diagnostic in &params.context.diagnostics {
            let Some(NumberOrString::String(code)) = &diagnostic.code else {
                continue;
            };
            match code.as_str() {
                "xsdNotSet" => {
                    if let Some(action) = insert_schema_location(&uri, class, text, diagnostic) {
                        actions.push(CodeActionOrCommand::CodeAction(action));
                    }
                }
                "duplicateGuid" => {
                    actions.push(CodeActionOrCommand::CodeAction(regenerate_guid(
                        &uri, diagnostic,
                    )));
                }
                _ => {}
            }
        }
        if actions.is_empty() {
            return Ok(None);
        }
        Ok(Some(actions))
    }
}

// ── Quick-fix builders ────────────────────────────────────────────────────────

const XMLNS_XSI: &str = r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#;

fn schema_name(class: FileClass) -> &'static str {
    match class {
        FileClass::Database => "Database.xsd",
        FileClass::Recipes => "CraftingRecipes.xsd",
        FileClass::Clothing => "Clothes.xsd",
        FileClass::Widget | FileClass::Other => "Schema.xsd",
    }
}

/// Inserts `xsi:noNamespaceSchemaLocation` (plus the `xmlns:xsi` declaration
/// when absent) right after the root tag's name.
fn insert_schema_location(
    uri: &Url,
    class: FileClass,
    text: &str,
    diagnostic: &Diagnostic,
) -> Option<CodeAction> {
    let start = &diagnostic.range.start;
    let line = text.lines().nth(start.line as usize)?;
    let tag = line.get(start.character as usize..)?.strip_prefix('<')?;
    let name_len = tag
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(tag.len());

    let at = Position::new(start.line, start.character + 1 + name_len as u32);
    let xmlns = if text.contains(XMLNS_XSI) { "" } else { XMLNS_XSI };
    let new_text = format!(
        r#"{xmlns} xsi:noNamespaceSchemaLocation="{}""#,
        schema_name(class)
    );

    Some(quick_fix(
        "Insert schema location".to_string(),
        uri,
        TextEdit { range: Range { start: at, end: at }, new_text },
        diagnostic,
    ))
}

fn regenerate_guid(uri: &Url, diagnostic: &Diagnostic) -> CodeAction {
    quick_fix(
        "Replace with a fresh GUID".to_string(),
        uri,
        TextEdit {
            range: diagnostic.range,
            new_text: format!(r#"Guid="{}""#, fresh_guid()),
        },
        diagnostic,
    )
}

fn quick_fix(title: String, uri: &Url, edit: TextEdit, diagnostic: &Diagnostic) -> CodeAction {
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![edit]);
    CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        is_preferred: Some(true),
        ..Default::default()
    }
}

// ── Misc helpers ──────────────────────────────────────────────────────────────

fn location(site: &TagSite) -> Location {
    Location {
        uri: site.uri.clone(),
        range: site.range,
    }
}

fn site_line(site: &TagSite) -> String {
    let file = site.uri.path().rsplit('/').next().unwrap_or("?");
    format!(
        "`{}` — tag `{}`, Name `{}` (line {})",
        file,
        site.tag,
        site.name.as_deref().unwrap_or("-"),
        site.range.start.line + 1
    )
}

//! Cross-file GUID graph.
//!
//! Every `Guid="..."` attribute defines an identifier; every
//! `InheritanceParent="..."` attribute references one.  The index is rebuilt
//! per document on change: entries for the document's path are removed
//! before the re-scan so stale sites never accumulate.

use std::collections::HashMap;

use tower_lsp::lsp_types::{Range, Url};

use crate::scan::{self, is_guid};

/// One tag carrying a GUID attribute: where it is and what it says.
#[derive(Debug, Clone, PartialEq)]
pub struct TagSite {
    pub tag: String,
    pub uri: Url,
    pub range: Range,
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct GuidIndex {
    definitions: HashMap<String, Vec<TagSite>>,
    references: HashMap<String, Vec<TagSite>>,
}

impl GuidIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every site recorded for `uri` (closed file, or pre-rescan).
    pub fn remove_document(&mut self, uri: &Url) {
        for map in [&mut self.definitions, &mut self.references] {
            map.retain(|_, sites| {
                sites.retain(|site| site.uri != *uri);
                !sites.is_empty()
            });
        }
    }

    /// Rescans one document, replacing whatever the index held for it.
    pub fn scan_document(&mut self, uri: &Url, text: &str) {
        self.remove_document(uri);
        for tag in scan::tags(text) {
            let name = tag.attr("Name").map(|a| a.value.clone());
            if let Some(attr) = tag.attr("Guid") {
                if is_guid(&attr.value) {
                    let range = scan::range_at(text, attr.offset, attr.offset + attr.span_len());
                    self.definitions.entry(attr.value.clone()).or_default().push(TagSite {
                        tag: tag.name.clone(),
                        uri: uri.clone(),
                        range,
                        name: name.clone(),
                    });
                }
            }
            if let Some(attr) = tag.attr("InheritanceParent") {
                if is_guid(&attr.value) {
                    let range = scan::range_at(text, attr.offset, attr.offset + attr.span_len());
                    self.references.entry(attr.value.clone()).or_default().push(TagSite {
                        tag: tag.name.clone(),
                        uri: uri.clone(),
                        range,
                        name,
                    });
                }
            }
        }
    }

    pub fn definitions(&self, guid: &str) -> &[TagSite] {
        self.definitions.get(guid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn references(&self, guid: &str) -> &[TagSite] {
        self.references.get(guid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates all definition sites grouped by GUID.
    pub fn all_definitions(&self) -> impl Iterator<Item = (&str, &[TagSite])> {
        self.definitions.iter().map(|(g, sites)| (g.as_str(), sites.as_slice()))
    }
}

// ── GUID generation ───────────────────────────────────────────────────────────

/// A fresh v4-shaped GUID for the duplicate-GUID quick fix.  Seeded from the
/// hasher's per-process randomness; unique enough for content files, not
/// cryptographic.
pub fn fresh_guid() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut bytes = [0u8; 16];
    for chunk in bytes.chunks_mut(8) {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(chunk.as_ptr() as u64);
        chunk.copy_from_slice(&hasher.finish().to_le_bytes());
    }
    bytes[6] = (bytes[6] & 0x0F) | 0x40;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;

    let h = |range: std::ops::Range<usize>| {
        bytes[range].iter().map(|b| format!("{b:02x}")).collect::<String>()
    };
    format!("{}-{}-{}-{}-{}", h(0..4), h(4..6), h(6..8), h(8..10), h(10..16))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUID_A: &str = "aaaaaaaa-0000-0000-0000-000000000001";
    const GUID_B: &str = "bbbbbbbb-0000-0000-0000-000000000002";

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///{name}")).unwrap()
    }

    #[test]
    fn scan_records_definitions_and_references() {
        let mut index = GuidIndex::new();
        let text = format!(
            r#"<Mod>
  <EntityTemplate Guid="{GUID_A}" Name="Boat" />
  <EntityTemplate Guid="{GUID_B}" InheritanceParent="{GUID_A}" />
</Mod>"#
        );
        index.scan_document(&uri("a.xdb"), &text);

        assert_eq!(index.definitions(GUID_A).len(), 1);
        assert_eq!(index.definitions(GUID_A)[0].name.as_deref(), Some("Boat"));
        assert_eq!(index.references(GUID_A).len(), 1);
        assert_eq!(index.references(GUID_A)[0].tag, "EntityTemplate");
    }

    #[test]
    fn rescan_replaces_old_sites() {
        let mut index = GuidIndex::new();
        let doc = uri("a.xdb");
        index.scan_document(&doc, &format!(r#"<Folder Guid="{GUID_A}" />"#));
        index.scan_document(&doc, &format!(r#"<Folder Guid="{GUID_B}" />"#));

        assert!(index.definitions(GUID_A).is_empty());
        assert_eq!(index.definitions(GUID_B).len(), 1);
    }

    #[test]
    fn removal_only_touches_one_document() {
        let mut index = GuidIndex::new();
        index.scan_document(&uri("a.xdb"), &format!(r#"<Folder Guid="{GUID_A}" />"#));
        index.scan_document(&uri("b.xdb"), &format!(r#"<Folder Guid="{GUID_A}" />"#));
        index.remove_document(&uri("a.xdb"));

        let sites = index.definitions(GUID_A);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].uri, uri("b.xdb"));
    }

    #[test]
    fn malformed_guids_are_not_indexed() {
        let mut index = GuidIndex::new();
        index.scan_document(&uri("a.xdb"), r#"<Folder Guid="not-a-guid" />"#);
        assert_eq!(index.all_definitions().count(), 0);
    }

    #[test]
    fn fresh_guids_are_well_formed_and_distinct() {
        let a = fresh_guid();
        let b = fresh_guid();
        assert!(crate::scan::is_guid(&a));
        assert_ne!(a, b);
    }
}

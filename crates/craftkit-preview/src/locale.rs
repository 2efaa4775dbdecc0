//! Localization tables and `[group:id]` label references.

use std::collections::HashMap;

/// String tables for the currently selected language: group → id → text.
#[derive(Debug, Default, Clone)]
pub struct LanguageTable {
    pub language: String,
    groups: HashMap<String, HashMap<String, String>>,
}

impl LanguageTable {
    pub fn new(language: impl Into<String>, groups: HashMap<String, HashMap<String, String>>) -> Self {
        Self { language: language.into(), groups }
    }

    pub fn lookup(&self, group: &str, id: &str) -> Option<&str> {
        self.groups.get(group)?.get(id).map(String::as_str)
    }

    /// Resolves a label's text: `[group:id]` references look up the table and
    /// fall back to the literal text when the reference is malformed or the
    /// entry is missing.
    pub fn resolve(&self, text: &str) -> String {
        match parse_reference(text) {
            Some((group, id)) => self
                .lookup(group, id)
                .map(str::to_string)
                .unwrap_or_else(|| text.to_string()),
            None => text.to_string(),
        }
    }
}

/// `[group:id]` where the group contains no space or colon and the id is all
/// digits. Anything else is plain text.
fn parse_reference(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let (group, id) = inner.split_once(':')?;
    if group.is_empty() || group.contains([' ', ':']) {
        return None;
    }
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((group, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LanguageTable {
        let mut groups = HashMap::new();
        let mut blocks = HashMap::new();
        blocks.insert("12".to_string(), "Granite".to_string());
        groups.insert("Blocks".to_string(), blocks);
        LanguageTable::new("English", groups)
    }

    #[test]
    fn reference_resolves() {
        assert_eq!(table().resolve("[Blocks:12]"), "Granite");
    }

    #[test]
    fn missing_entry_falls_back_to_literal() {
        assert_eq!(table().resolve("[Blocks:99]"), "[Blocks:99]");
        assert_eq!(table().resolve("[Items:12]"), "[Items:12]");
    }

    #[test]
    fn malformed_references_are_plain_text() {
        let t = table();
        assert_eq!(t.resolve("[Blocks:twelve]"), "[Blocks:twelve]");
        assert_eq!(t.resolve("[Two Words:12]"), "[Two Words:12]");
        assert_eq!(t.resolve("[a:b:12]"), "[a:b:12]");
        assert_eq!(t.resolve("no brackets"), "no brackets");
    }
}

//! Lightweight tag scanning over content-file text.
//!
//! We deliberately avoid a full XML parse here: files are routinely
//! incomplete while being edited, and the diagnostics only need tag names,
//! attributes, and byte offsets.  A forgiving single-pass scanner recovers
//! from malformed tags by skipping to the next `>`.

use tower_lsp::lsp_types::{Position, Range};

// ── File classes ──────────────────────────────────────────────────────────────

/// What kind of content file a path names, decided purely by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Template database: `.xdb` or `Database.xml`.
    Database,
    /// Crafting recipes: `.cr` or `CraftingRecipes.xml`.
    Recipes,
    /// Clothing definitions: `.clo` or `Clothes.xml`.
    Clothing,
    /// Widget markup: `.wgt`.
    Widget,
    Other,
}

impl FileClass {
    pub fn of(path: &str) -> FileClass {
        let lower = path.to_lowercase();
        if lower.ends_with(".xdb") || path.ends_with("Database.xml") {
            FileClass::Database
        } else if lower.ends_with(".cr") || path.ends_with("CraftingRecipes.xml") {
            FileClass::Recipes
        } else if lower.ends_with(".clo") || path.ends_with("Clothes.xml") {
            FileClass::Clothing
        } else if lower.ends_with(".wgt") {
            FileClass::Widget
        } else {
            FileClass::Other
        }
    }

    /// Whether the path uses the bare extension form (`.xdb` rather than
    /// `Database.xml`).  Only those files carry the schema-location warning;
    /// the `.xml` spellings ship inside the game and are trusted.
    pub fn wants_schema_location(self, path: &str) -> bool {
        let lower = path.to_lowercase();
        match self {
            FileClass::Database => lower.ends_with(".xdb"),
            FileClass::Recipes => lower.ends_with(".cr"),
            FileClass::Clothing => lower.ends_with(".clo"),
            _ => false,
        }
    }
}

// ── Tag scanning ──────────────────────────────────────────────────────────────

/// One `name="value"` pair inside a tag. `offset` is the byte offset of the
/// attribute name; `span_len` covers `name="value"` through the closing quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
    pub offset: usize,
}

impl Attr {
    pub fn span_len(&self) -> usize {
        self.name.len() + 2 + self.value.len() + 1
    }
}

/// An opening tag: `<Name attr="v" ...>` with byte offsets into the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub attrs: Vec<Attr>,
}

impl TagSpan {
    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

/// Scans every opening tag in the text. Closing tags, comments, and
/// processing instructions are skipped.
pub fn tags(text: &str) -> Vec<TagSpan> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let name_start = i + 1;
        if name_start >= bytes.len() || !bytes[name_start].is_ascii_alphabetic() {
            i += 1;
            continue;
        }
        let mut j = name_start;
        while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
            j += 1;
        }
        let mut tag = TagSpan {
            name: text[name_start..j].to_string(),
            start: i,
            end: j,
            attrs: Vec::new(),
        };

        loop {
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match bytes.get(j) {
                None => break,
                Some(b'>') => {
                    j += 1;
                    break;
                }
                Some(b'/') => {
                    j += 1;
                    continue;
                }
                _ => {}
            }
            let attr_start = j;
            while j < bytes.len() && is_attr_name_byte(bytes[j]) {
                j += 1;
            }
            if j == attr_start {
                // Unparseable junk; give up on this tag's attributes.
                while j < bytes.len() && bytes[j] != b'>' {
                    j += 1;
                }
                continue;
            }
            let name = text[attr_start..j].to_string();
            if bytes.get(j) != Some(&b'=') || bytes.get(j + 1) != Some(&b'"') {
                continue;
            }
            j += 2;
            let value_start = j;
            while j < bytes.len() && bytes[j] != b'"' {
                j += 1;
            }
            let value = text[value_start..j].to_string();
            j = (j + 1).min(bytes.len());
            tag.attrs.push(Attr { name, value, offset: attr_start });
        }

        tag.end = j;
        out.push(tag);
        i = j;
    }
    out
}

fn is_attr_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b':' || b == b'-' || b == b'.'
}

// ── GUIDs ─────────────────────────────────────────────────────────────────────

/// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, hex digits only.
pub fn is_guid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    s.bytes().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

/// The GUID containing or touching the cursor, with its range on the line.
pub fn guid_at(text: &str, pos: &Position) -> Option<(String, Range)> {
    let line = text.lines().nth(pos.line as usize)?;
    let col = (pos.character as usize).min(line.len());

    let start = line[..col]
        .rfind(|c: char| !c.is_ascii_hexdigit() && c != '-')
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = col
        + line[col..]
            .find(|c: char| !c.is_ascii_hexdigit() && c != '-')
            .unwrap_or(line.len() - col);

    let word = &line[start..end];
    if !is_guid(word) {
        return None;
    }
    let range = Range {
        start: Position::new(pos.line, start as u32),
        end: Position::new(pos.line, end as u32),
    };
    Some((word.to_string(), range))
}

// ── Offset ⇄ position ─────────────────────────────────────────────────────────

pub fn position_at(text: &str, offset: usize) -> Position {
    let clamped = offset.min(text.len());
    let mut line = 0u32;
    let mut line_start = 0usize;
    for (i, b) in text.bytes().enumerate().take(clamped) {
        if b == b'\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    Position::new(line, (clamped - line_start) as u32)
}

pub fn range_at(text: &str, start: usize, end: usize) -> Range {
    Range {
        start: position_at(text, start),
        end: position_at(text, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_file_name() {
        assert_eq!(FileClass::of("mods/Extra.xdb"), FileClass::Database);
        assert_eq!(FileClass::of("Content/Database.xml"), FileClass::Database);
        assert_eq!(FileClass::of("Mine.CR"), FileClass::Recipes);
        assert_eq!(FileClass::of("Outfit.clo"), FileClass::Clothing);
        assert_eq!(FileClass::of("MainMenu.wgt"), FileClass::Widget);
        assert_eq!(FileClass::of("notes.txt"), FileClass::Other);
    }

    #[test]
    fn schema_warning_only_for_extension_spellings() {
        assert!(FileClass::Database.wants_schema_location("Extra.xdb"));
        assert!(!FileClass::Database.wants_schema_location("Database.xml"));
        assert!(FileClass::Recipes.wants_schema_location("More.cr"));
    }

    #[test]
    fn scans_tags_and_attributes() {
        let text = r#"<Mod><EntityTemplate Guid="abc" Name="Boat" /></Mod>"#;
        let found = tags(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].name, "EntityTemplate");
        assert_eq!(found[1].attr("Name").unwrap().value, "Boat");
        let guid = found[1].attr("Guid").unwrap();
        assert_eq!(&text[guid.offset..guid.offset + guid.span_len()], r#"Guid="abc""#);
    }

    #[test]
    fn scanner_survives_malformed_tags() {
        let found = tags("<Broken Name=oops><Next Ok=\"1\" />");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].attr("Ok").unwrap().value, "1");
    }

    #[test]
    fn guid_shape_is_checked() {
        assert!(is_guid("01234567-89ab-cdef-0123-456789abcdef"));
        assert!(!is_guid("01234567-89ab-cdef-0123-456789abcde"));
        assert!(!is_guid("01234567x89ab-cdef-0123-456789abcdef"));
    }

    #[test]
    fn guid_under_cursor_is_found() {
        let text = r#"<A InheritanceParent="01234567-89ab-cdef-0123-456789abcdef" />"#;
        let (guid, range) = guid_at(text, &Position::new(0, 30)).unwrap();
        assert_eq!(guid, "01234567-89ab-cdef-0123-456789abcdef");
        assert_eq!(range.start.character, 22);
        assert!(guid_at(text, &Position::new(0, 2)).is_none());
    }

    #[test]
    fn positions_count_lines_and_columns() {
        let text = "ab\ncdef\ng";
        assert_eq!(position_at(text, 0), Position::new(0, 0));
        assert_eq!(position_at(text, 5), Position::new(1, 2));
        assert_eq!(position_at(text, 8), Position::new(2, 0));
    }
}

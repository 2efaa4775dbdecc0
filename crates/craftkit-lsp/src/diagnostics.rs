//! Diagnostics for each content-file class.
//!
//! Database files get the GUID and inheritance checks, recipe files the
//! ingredient check, and every extension-spelled file the schema-location
//! warning.  Widget markup goes through the real parser; everything else is
//! checked by the forgiving scanner so half-typed documents still produce
//! useful results.

use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, Location, NumberOrString,
    Position, Range, Url,
};

use crate::index::GuidIndex;
use crate::recipes;
use crate::scan::{self, is_guid, FileClass};

pub const SOURCE: &str = "craftkit-lsp";

const LOW_LEVEL_TAGS: &[&str] = &["Parameter", "ParameterSet", "MemberComponentTemplate"];

/// Which tags a tag may name in `InheritanceParent`. Tags not listed here
/// (and `Folder`/`Parameter`, listed empty) cannot inherit at all.
fn allowed_inheritance_parents(tag: &str) -> &'static [&'static str] {
    match tag {
        "ProjectTemplate" => &["ProjectTemplate"],
        "MemberSubsystemTemplate" => &["SubsystemTemplate"],
        "SubsystemTemplate" => &["SubsystemTemplate"],
        "EntityTemplate" => &["EntityTemplate"],
        "ComponentTemplate" => &["ComponentTemplate"],
        "MemberComponentTemplate" => &["ComponentTemplate"],
        "ParameterSet" => &["SubsystemTemplate", "MemberComponentTemplate"],
        _ => &[],
    }
}

fn diagnostic(range: Range, severity: DiagnosticSeverity, code: &str, message: String) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(severity),
        code: Some(NumberOrString::String(code.to_string())),
        source: Some(SOURCE.to_string()),
        message,
        ..Default::default()
    }
}

fn related(site_uri: &Url, range: Range, message: &str) -> DiagnosticRelatedInformation {
    DiagnosticRelatedInformation {
        location: Location { uri: site_uri.clone(), range },
        message: message.to_string(),
    }
}

// ── Per-class entry points ────────────────────────────────────────────────────

/// All diagnostics for one document. The GUID index must already hold the
/// document's current scan.
pub fn for_document(
    uri: &Url,
    class: FileClass,
    text: &str,
    index: &GuidIndex,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if class.wants_schema_location(uri.path()) {
        out.extend(xsd_not_set(text));
    }
    match class {
        FileClass::Database => {
            duplicate_guids(uri, index, &mut out);
            inheritance_checks(text, index, &mut out);
        }
        FileClass::Recipes => missing_ingredients(text, &mut out),
        FileClass::Widget => out.extend(markup_errors(text)),
        FileClass::Clothing | FileClass::Other => {}
    }
    out
}

// ── Schema location ───────────────────────────────────────────────────────────

fn xsd_not_set(text: &str) -> Option<Diagnostic> {
    if text.contains("xsi:noNamespaceSchemaLocation") {
        return None;
    }
    let root = scan::tags(text).into_iter().next()?;
    Some(diagnostic(
        scan::range_at(text, root.start, root.end),
        DiagnosticSeverity::WARNING,
        "xsdNotSet",
        "no schema location set; validation and completion are unavailable".to_string(),
    ))
}

// ── Duplicate GUIDs ───────────────────────────────────────────────────────────

/// A duplicate is tag-name-aware: low-level tags clash with every other use
/// of the GUID, `Folder` duplicates only clash within one file, and template
/// tags clash only when a differently-named tag shares the GUID (same-name
/// re-declarations across files are the override mechanism, not an error).
fn duplicate_guids(uri: &Url, index: &GuidIndex, out: &mut Vec<Diagnostic>) {
    for (guid, sites) in index.all_definitions() {
        for (i, site) in sites.iter().enumerate() {
            if site.uri != *uri {
                continue;
            }
            let low_level = LOW_LEVEL_TAGS.contains(&site.tag.as_str());
            let clashes: Vec<DiagnosticRelatedInformation> = sites
                .iter()
                .enumerate()
                .filter(|(j, other)| {
                    if *j == i {
                        return false;
                    }
                    if low_level {
                        return true;
                    }
                    other.tag != site.tag
                        || (site.tag == "Folder" && other.uri == site.uri)
                })
                .map(|(_, other)| related(&other.uri, other.range, "GUID also used here"))
                .collect();
            if clashes.is_empty() {
                continue;
            }
            let mut d = diagnostic(
                site.range,
                DiagnosticSeverity::ERROR,
                "duplicateGuid",
                format!("duplicate GUID {guid}"),
            );
            d.related_information = Some(clashes);
            out.push(d);
        }
    }
}

// ── Inheritance ───────────────────────────────────────────────────────────────

fn inheritance_checks(text: &str, index: &GuidIndex, out: &mut Vec<Diagnostic>) {
    for tag in scan::tags(text) {
        let Some(attr) = tag.attr("InheritanceParent") else {
            continue;
        };
        if !is_guid(&attr.value) {
            continue;
        }
        let range = scan::range_at(text, attr.offset, attr.offset + attr.span_len());

        let allowed = allowed_inheritance_parents(&tag.name);
        if allowed.is_empty() {
            out.push(diagnostic(
                range,
                DiagnosticSeverity::ERROR,
                "tagCannotHaveInheritanceParent",
                format!("<{}> cannot have an InheritanceParent", tag.name),
            ));
            continue;
        }

        let parents = index.definitions(&attr.value);
        if parents.is_empty() {
            out.push(diagnostic(
                range,
                DiagnosticSeverity::ERROR,
                "inheritanceParentNotFound",
                format!("no tag defines GUID {}", attr.value),
            ));
            continue;
        }

        let wrong: Vec<DiagnosticRelatedInformation> = parents
            .iter()
            .filter(|parent| !allowed.contains(&parent.tag.as_str()))
            .map(|parent| related(&parent.uri, parent.range, &format!("defined by <{}>", parent.tag)))
            .collect();
        if !wrong.is_empty() {
            let mut d = diagnostic(
                range,
                DiagnosticSeverity::ERROR,
                "invalidInheritanceParent",
                format!("<{}> cannot inherit from this tag", tag.name),
            );
            d.related_information = Some(wrong);
            out.push(d);
        }
    }
}

// ── Recipe grids ──────────────────────────────────────────────────────────────

fn missing_ingredients(text: &str, out: &mut Vec<Diagnostic>) {
    let lines: Vec<&str> = text.lines().collect();
    for tag in scan::tags(text) {
        if tag.name != "Recipe" {
            continue;
        }
        let letters: Vec<char> = recipes::declared_ingredients(&tag)
            .into_iter()
            .map(|i| i.letter)
            .collect();
        let mut line_idx = scan::position_at(text, tag.end).line as usize + 1;
        while line_idx < lines.len() {
            let Some((col, row)) = recipes::grid_row(lines[line_idx]) else {
                break;
            };
            for (i, c) in row.chars().enumerate() {
                if c.is_ascii_lowercase() && !letters.contains(&c) {
                    let at = (col + i) as u32;
                    out.push(diagnostic(
                        Range {
                            start: Position::new(line_idx as u32, at),
                            end: Position::new(line_idx as u32, at + 1),
                        },
                        DiagnosticSeverity::ERROR,
                        "ingredientNotSet",
                        format!("ingredient \"{c}\" is not declared on the <Recipe> tag"),
                    ));
                }
            }
            line_idx += 1;
        }
    }
}

// ── Widget markup ─────────────────────────────────────────────────────────────

fn markup_errors(text: &str) -> Option<Diagnostic> {
    let e = craftkit_markup::parse_str(text).err()?;
    // ParseError line/col are 1-based; LSP Position is 0-based.
    let line = e.line.saturating_sub(1) as u32;
    let col = e.col.saturating_sub(1) as u32;
    Some(diagnostic(
        Range {
            start: Position::new(line, col),
            end: Position::new(line, col + 1),
        },
        DiagnosticSeverity::ERROR,
        "markupParseError",
        e.message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUID_A: &str = "aaaaaaaa-0000-0000-0000-000000000001";
    const GUID_B: &str = "bbbbbbbb-0000-0000-0000-000000000002";

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///{name}")).unwrap()
    }

    fn database(uri_name: &str, text: &str, index: &mut GuidIndex) -> Vec<Diagnostic> {
        let doc = uri(uri_name);
        index.scan_document(&doc, text);
        for_document(&doc, FileClass::Database, text, index)
    }

    fn codes(diags: &[Diagnostic]) -> Vec<String> {
        diags
            .iter()
            .filter_map(|d| match &d.code {
                Some(NumberOrString::String(s)) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn warns_when_the_schema_location_is_missing() {
        let text = format!(r#"<Mod><Folder Guid="{GUID_A}" /></Mod>"#);
        let diags = database("a.xdb", &text, &mut GuidIndex::new());
        assert_eq!(codes(&diags), vec!["xsdNotSet"]);
        assert_eq!(diags[0].severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(diags[0].range.start, Position::new(0, 0));

        let set = r#"<Mod xsi:noNamespaceSchemaLocation="Database.xsd"></Mod>"#;
        assert!(database("a.xdb", set, &mut GuidIndex::new()).is_empty());
    }

    #[test]
    fn xml_spelling_skips_the_schema_warning() {
        let diags = database("Database.xml", "<Mod></Mod>", &mut GuidIndex::new());
        assert!(diags.is_empty());
    }

    #[test]
    fn low_level_tags_clash_with_any_shared_guid() {
        let text = format!(
            "<Mod xsi:noNamespaceSchemaLocation=\"x\">\n\
             <Parameter Guid=\"{GUID_A}\" />\n\
             <EntityTemplate Guid=\"{GUID_A}\" />\n\
             </Mod>"
        );
        let diags = database("a.xdb", &text, &mut GuidIndex::new());
        // Both sites report: the Parameter clashes with everything, and the
        // template sees a differently-named tag on its GUID.
        assert_eq!(codes(&diags), vec!["duplicateGuid", "duplicateGuid"]);
        let info = diags[0].related_information.as_ref().unwrap();
        assert_eq!(info.len(), 1);
    }

    #[test]
    fn same_template_tag_across_files_is_an_override_not_a_clash() {
        let mut index = GuidIndex::new();
        let base = format!("<Mod xsi:noNamespaceSchemaLocation=\"x\"><EntityTemplate Guid=\"{GUID_A}\" /></Mod>");
        index.scan_document(&uri("base.xdb"), &base);

        let text = format!("<Mod xsi:noNamespaceSchemaLocation=\"x\"><EntityTemplate Guid=\"{GUID_A}\" /></Mod>");
        let diags = database("override.xdb", &text, &mut index);
        assert!(diags.is_empty());
    }

    #[test]
    fn folder_duplicates_clash_only_within_one_file() {
        let mut index = GuidIndex::new();
        let other = format!("<Mod xsi:noNamespaceSchemaLocation=\"x\"><Folder Guid=\"{GUID_A}\" /></Mod>");
        index.scan_document(&uri("other.xdb"), &other);

        let clean = format!("<Mod xsi:noNamespaceSchemaLocation=\"x\"><Folder Guid=\"{GUID_A}\" /></Mod>");
        assert!(database("a.xdb", &clean, &mut index).is_empty());

        let doubled = format!(
            "<Mod xsi:noNamespaceSchemaLocation=\"x\">\n\
             <Folder Guid=\"{GUID_A}\" />\n\
             <Folder Guid=\"{GUID_A}\" />\n\
             </Mod>"
        );
        let diags = database("a.xdb", &doubled, &mut index);
        assert_eq!(codes(&diags), vec!["duplicateGuid", "duplicateGuid"]);
    }

    #[test]
    fn folders_cannot_inherit() {
        let text = format!(
            "<Mod xsi:noNamespaceSchemaLocation=\"x\"><Folder InheritanceParent=\"{GUID_A}\" /></Mod>"
        );
        let diags = database("a.xdb", &text, &mut GuidIndex::new());
        assert_eq!(codes(&diags), vec!["tagCannotHaveInheritanceParent"]);
    }

    #[test]
    fn inheritance_must_target_an_allowed_tag() {
        let text = format!(
            "<Mod xsi:noNamespaceSchemaLocation=\"x\">\n\
             <ComponentTemplate Guid=\"{GUID_A}\" Name=\"Base\" />\n\
             <EntityTemplate Guid=\"{GUID_B}\" InheritanceParent=\"{GUID_A}\" />\n\
             </Mod>"
        );
        let diags = database("a.xdb", &text, &mut GuidIndex::new());
        assert_eq!(codes(&diags), vec!["invalidInheritanceParent"]);
        assert!(diags[0].related_information.is_some());
    }

    #[test]
    fn valid_inheritance_is_quiet() {
        let text = format!(
            "<Mod xsi:noNamespaceSchemaLocation=\"x\">\n\
             <EntityTemplate Guid=\"{GUID_A}\" />\n\
             <EntityTemplate Guid=\"{GUID_B}\" InheritanceParent=\"{GUID_A}\" />\n\
             </Mod>"
        );
        assert!(database("a.xdb", &text, &mut GuidIndex::new()).is_empty());
    }

    #[test]
    fn unresolved_inheritance_parent_is_reported() {
        let text = format!(
            "<Mod xsi:noNamespaceSchemaLocation=\"x\"><EntityTemplate InheritanceParent=\"{GUID_A}\" /></Mod>"
        );
        let diags = database("a.xdb", &text, &mut GuidIndex::new());
        assert_eq!(codes(&diags), vec!["inheritanceParentNotFound"]);
    }

    #[test]
    fn undeclared_grid_letters_are_flagged() {
        let text = "<Recipes xsi:noNamespaceSchemaLocation=\"x\">\n\
                    <Recipe Result=\"axe\" a=\"planks\">\n\
                    \t\"ab\"\n\
                    </Recipe>\n\
                    </Recipes>";
        let diags =
            for_document(&uri("a.cr"), FileClass::Recipes, text, &GuidIndex::new());
        assert_eq!(codes(&diags), vec!["ingredientNotSet"]);
        assert_eq!(diags[0].range.start, Position::new(2, 3));
    }

    #[test]
    fn widget_markup_uses_the_real_parser() {
        let diags = for_document(
            &uri("Broken.wgt"),
            FileClass::Widget,
            "<CanvasWidget><Oops></CanvasWidget>",
            &GuidIndex::new(),
        );
        assert_eq!(codes(&diags), vec!["markupParseError"]);

        let ok = for_document(&uri("Ok.wgt"), FileClass::Widget, "<CanvasWidget />", &GuidIndex::new());
        assert!(ok.is_empty());
    }
}

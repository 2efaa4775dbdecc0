//! Crafting-recipe grids.
//!
//! A `<Recipe>` tag declares single-letter ingredient shorthands as
//! attributes (`a="planks" b="stick"`) and lays the craft grid out in quoted
//! rows right below the tag:
//!
//! ```text
//! <Recipe Result="axe" a="planks" b="stick">
//!   "ab "
//!   " b "
//! </Recipe>
//! ```

use crate::scan::{self, TagSpan};

/// One declared shorthand: the row letter and the block value it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub letter: char,
    pub value: String,
}

/// Matches a grid row: optional indent, then `"..."` holding only lowercase
/// letters and spaces. Returns the byte column of the first cell and the run.
pub fn grid_row(line: &str) -> Option<(usize, &str)> {
    let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
    let body = line[indent..].strip_prefix('"')?.strip_suffix('"')?;
    if body.chars().all(|c| c == ' ' || c.is_ascii_lowercase()) {
        Some((indent + 1, body))
    } else {
        None
    }
}

/// The single-letter shorthands a `<Recipe>` tag declares.
pub fn declared_ingredients(tag: &TagSpan) -> Vec<Ingredient> {
    tag.attrs
        .iter()
        .filter(|a| a.name.len() == 1 && a.name.as_bytes()[0].is_ascii_lowercase())
        .map(|a| Ingredient {
            letter: a.name.as_bytes()[0] as char,
            value: a.value.clone(),
        })
        .collect()
}

/// Ingredients usable on a grid-row line: those declared by the nearest
/// `<Recipe>` tag above it, provided only grid rows (or blanks) intervene.
pub fn ingredients_at(text: &str, line_idx: usize) -> Option<Vec<Ingredient>> {
    let lines: Vec<&str> = text.lines().collect();
    if line_idx >= lines.len() {
        return None;
    }

    let mut recipe_line = None;
    for i in (0..line_idx).rev() {
        let line = lines[i];
        if line.contains("<Recipe") {
            recipe_line = Some(i as u32);
            break;
        }
        if line.trim().is_empty() || grid_row(line).is_some() {
            continue;
        }
        return None;
    }
    let recipe_line = recipe_line?;

    scan::tags(text)
        .iter()
        .find(|tag| {
            tag.name == "Recipe" && scan::position_at(text, tag.start).line == recipe_line
        })
        .map(declared_ingredients)
}

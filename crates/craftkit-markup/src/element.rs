// ── Attr ──────────────────────────────────────────────────────────────────

/// A single `name="value"` attribute. Order is preserved: style merging and
/// diagnostics both care about the order attributes were written in.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

// ── Element ───────────────────────────────────────────────────────────────

/// One element of the markup tree.
///
/// Text content is intentionally not modeled: the widget markup and the
/// database files are element-and-attribute formats, and the preview clones
/// only element children during style resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Append an attribute without checking for duplicates.
    pub fn push_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push(Attr { name: name.into(), value: value.into() });
    }

    /// Replace an attribute's value, appending it if absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.into(),
            None => self.push_attr(name, value),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|a| a.name != name);
    }

    /// The conventional `Name="..."` attribute used for override matching.
    pub fn name(&self) -> Option<&str> {
        self.attr("Name")
    }

    /// First child carrying `Name="name"`.
    pub fn named_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name() == Some(name))
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// The top-level parse result for one markup source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

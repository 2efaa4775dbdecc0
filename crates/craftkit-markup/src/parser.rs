use crate::element::{Document, Element};
use crate::error::ParseError;
use crate::lexer::Cursor;

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser<'s> {
    cursor: Cursor<'s>,
}

impl<'s> Parser<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { cursor: Cursor::new(src) }
    }

    // ── Document ──────────────────────────────────────────────────────────

    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        self.skip_misc()?;
        if !self.cursor.starts_with("<") {
            return Err(self.cursor.err("expected a root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;
        if !self.cursor.is_eof() {
            return Err(self.cursor.err("content after the root element"));
        }
        Ok(Document { root })
    }

    /// Skip whitespace, comments, the XML declaration and DOCTYPE/processing
    /// instructions that may precede or follow an element.
    fn skip_misc(&mut self) -> Result<(), ParseError> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat("<!--") {
                self.cursor.skip_until("-->", "comment")?;
            } else if self.cursor.starts_with("<?") {
                self.cursor.skip_until("?>", "processing instruction")?;
            } else if self.cursor.starts_with("<!") {
                self.cursor.skip_until(">", "declaration")?;
            } else {
                return Ok(());
            }
        }
    }

    // ── Element ───────────────────────────────────────────────────────────

    fn parse_element(&mut self) -> Result<Element, ParseError> {
        self.cursor.bump(); // consume `<`
        let tag = self.cursor.read_name()?;
        let mut element = Element::new(tag);

        // Attributes until `>` or `/>`.
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat("/>") {
                return Ok(element);
            }
            if self.cursor.eat(">") {
                break;
            }
            if self.cursor.is_eof() {
                return Err(self.cursor.err(format!("unterminated <{}> tag", element.tag)));
            }
            let name = self.cursor.read_name()?;
            self.cursor.skip_whitespace();
            if !self.cursor.eat("=") {
                return Err(self.cursor.err(format!("attribute {name:?} is missing '='")));
            }
            self.cursor.skip_whitespace();
            let value = self.cursor.read_quoted()?;
            element.push_attr(name, value);
        }

        // Children until the matching close tag. Text content is skipped.
        loop {
            if self.cursor.starts_with("</") {
                self.cursor.eat("</");
                let close = self.cursor.read_name()?;
                if close != element.tag {
                    return Err(self.cursor.err(format!(
                        "mismatched close tag: expected </{}>, got </{close}>",
                        element.tag
                    )));
                }
                self.cursor.skip_whitespace();
                if !self.cursor.eat(">") {
                    return Err(self.cursor.err(format!("unterminated </{close}> tag")));
                }
                return Ok(element);
            }
            if self.cursor.eat("<!--") {
                self.cursor.skip_until("-->", "comment")?;
                continue;
            }
            if self.cursor.starts_with("<![CDATA[") {
                self.cursor.skip_until("]]>", "CDATA section")?;
                continue;
            }
            match self.cursor.peek() {
                None => {
                    return Err(self.cursor.err(format!("missing </{}> close tag", element.tag)));
                }
                Some('<') => element.children.push(self.parse_element()?),
                // Text content (including entity references) is not modeled.
                Some('&') => {
                    self.cursor.skip_until(";", "entity reference")?;
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse one markup source string into a [`Document`].
pub fn parse_str(src: &str) -> Result<Document, ParseError> {
    Parser::new(src).parse_document()
}

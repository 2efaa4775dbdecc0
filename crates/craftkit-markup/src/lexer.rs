use crate::error::ParseError;

// ── Cursor ────────────────────────────────────────────────────────────────

/// Low-level character scanner with line/column tracking.
///
/// XML-ish markup is context-sensitive (text between tags vs. markup inside
/// them), so there is no flat token stream; the parser drives this cursor
/// directly.
pub struct Cursor<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0, line: 1, col: 1 }
    }

    pub fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// 1-based (line, col) of the next unconsumed character.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    pub fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.line, self.col)
    }

    pub fn bump(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume `prefix` if it is next; returns whether it was consumed.
    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            for _ in prefix.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Skip until after `terminator`. Used for comments, the XML prolog and
    /// processing instructions. Errors if EOF is reached first.
    pub fn skip_until(&mut self, terminator: &str, what: &str) -> Result<(), ParseError> {
        loop {
            if self.eat(terminator) {
                return Ok(());
            }
            if self.bump().is_none() {
                return Err(self.err(format!("unterminated {what}")));
            }
        }
    }

    /// Read an XML name: `[A-Za-z_:][A-Za-z0-9_:.-]*`.
    pub fn read_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {
                name.push(c);
                self.bump();
            }
            other => return Err(self.err(format!("expected a name, got {other:?}"))),
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '-') {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok(name)
    }

    /// Read a quoted attribute value (single or double quotes), decoding the
    /// five predefined entities and numeric character references.
    pub fn read_quoted(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            other => return Err(self.err(format!("expected a quoted value, got {other:?}"))),
        };
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.err("unterminated attribute value")),
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(value);
                }
                Some('&') => value.push(self.read_entity()?),
                Some('<') => return Err(self.err("raw '<' inside attribute value")),
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }

    fn read_entity(&mut self) -> Result<char, ParseError> {
        self.bump(); // consume `&`
        let mut body = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated entity reference")),
                Some(';') => break,
                Some(c) if body.len() < 8 => body.push(c),
                Some(_) => return Err(self.err("entity reference too long")),
            }
        }
        match body.as_str() {
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "amp" => Ok('&'),
            "quot" => Ok('"'),
            "apos" => Ok('\''),
            _ => {
                let code = if let Some(hex) = body.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = body.strip_prefix('#') {
                    dec.parse().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| self.err(format!("unknown entity &{body};")))
            }
        }
    }
}

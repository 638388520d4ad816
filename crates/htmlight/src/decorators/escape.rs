use std::io::{self, Write};

use crate::decorator::{Highlight, TokenRenderer};
use crate::scanner::{Token, XmlEscKind, XmlEscTokenizer};

/// Renderer replacing `& < > "` with their entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct Escape;

impl TokenRenderer<XmlEscKind> for Escape {
    fn token(&mut self, out: &mut dyn Write, line: &[u8], token: Token<XmlEscKind>) -> io::Result<()> {
        match token.kind.entity() {
            Some(entity) => out.write_all(entity),
            None => out.write_all(token.text(line)),
        }
    }
}

/// Escapes text for inclusion in HTML.
///
/// Formatted: callers wrap its output in a preformatted block.
pub type HtmlEscaper = Highlight<XmlEscTokenizer, Escape>;

impl HtmlEscaper {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(XmlEscTokenizer::default(), Escape, true)
    }
}

impl Default for HtmlEscaper {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `text` to `out` with HTML special characters escaped.
///
/// For renderers that escape the text of their own tokens.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn escape_into(out: &mut dyn Write, text: &[u8]) -> io::Result<()> {
    let mut plain = 0;
    for (at, &b) in text.iter().enumerate() {
        let entity: &[u8] = match b {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            _ => continue,
        };
        out.write_all(&text[plain..at])?;
        out.write_all(entity)?;
        plain = at + 1;
    }
    out.write_all(&text[plain..])
}

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Cursor, Engine, Lexer, Step, TokenKind, TokenListener};

/// Tokens of the escaping scanner: plain data and the four characters that
/// must be replaced by entities in HTML text and attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum XmlEscKind {
    Error,
    AmpEscape,
    Data,
    GtEscape,
    LtEscape,
    QuotEscape,
}

impl XmlEscKind {
    /// The entity replacing this token, if it is one of the escapes.
    #[must_use]
    pub fn entity(self) -> Option<&'static [u8]> {
        match self {
            Self::AmpEscape => Some(b"&amp;"),
            Self::GtEscape => Some(b"&gt;"),
            Self::LtEscape => Some(b"&lt;"),
            Self::QuotEscape => Some(b"&quot;"),
            Self::Error | Self::Data => None,
        }
    }

    fn of_byte(b: u8) -> Option<Self> {
        match b {
            b'&' => Some(Self::AmpEscape),
            b'>' => Some(Self::GtEscape),
            b'<' => Some(Self::LtEscape),
            b'"' => Some(Self::QuotEscape),
            _ => None,
        }
    }
}

impl fmt::Display for XmlEscKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::AmpEscape => "ampEscape",
            Self::Data => "data",
            Self::GtEscape => "gtEscape",
            Self::LtEscape => "ltEscape",
            Self::QuotEscape => "quotEscape",
        })
    }
}

impl TokenKind for XmlEscKind {
    const ERROR: Self = Self::Error;

    fn css_class(self) -> Option<&'static str> {
        None
    }
}

#[derive(Debug, Default)]
pub struct XmlEscLexer;

impl Lexer for XmlEscLexer {
    type Kind = XmlEscKind;

    const LINE_CONTINUATION: bool = true;

    fn in_flight(&self) -> Option<XmlEscKind> {
        Some(XmlEscKind::Data)
    }

    fn step<L: TokenListener<XmlEscKind> + ?Sized>(
        &mut self,
        cur: &mut Cursor<'_, XmlEscKind, L>,
    ) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        if let Some(escape) = XmlEscKind::of_byte(b) {
            cur.emit(XmlEscKind::Data);
            cur.bump();
            cur.emit(escape);
        } else {
            cur.bump_run(|b| XmlEscKind::of_byte(b).is_some());
        }
        Step::Continue
    }

    fn line_end(&mut self, _escaped: bool) {}
}

/// Splits text into data runs and the characters HTML needs escaped.
pub type XmlEscTokenizer = Engine<XmlEscLexer>;

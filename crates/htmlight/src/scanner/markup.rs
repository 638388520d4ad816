use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    Cursor, Engine, Lexer, Step, TokenKind, TokenListener,
    engine::prefix_len,
    xml::{Markup, comment_close_at, is_name_byte, markup_at},
};

/// Elements known to the markup scanner, sorted for binary search.
///
/// The DocBook subset used for technical documentation.
pub const KEYWORDS: &[&str] = &[
    "abstract",
    "address",
    "anchor",
    "appendix",
    "article",
    "author",
    "blockquote",
    "book",
    "caption",
    "chapter",
    "citation",
    "code",
    "command",
    "computeroutput",
    "emphasis",
    "entry",
    "example",
    "figure",
    "filename",
    "footnote",
    "function",
    "glossary",
    "imagedata",
    "imageobject",
    "important",
    "index",
    "informaltable",
    "itemizedlist",
    "keyword",
    "link",
    "listitem",
    "literal",
    "mediaobject",
    "note",
    "orderedlist",
    "para",
    "part",
    "phrase",
    "preface",
    "programlisting",
    "quote",
    "row",
    "screen",
    "sect1",
    "sect2",
    "sect3",
    "section",
    "simpara",
    "table",
    "tbody",
    "term",
    "tgroup",
    "thead",
    "tip",
    "title",
    "ulink",
    "variablelist",
    "varlistentry",
    "warning",
    "xref",
];

/// Token kind of the markup scanner.
///
/// Kinds are ordinals: `0` is the error kind, element `i` of [`KEYWORDS`]
/// has its end tag at `2 * i + 1` and its start tag at `2 * i + 2`, so a
/// kind is even exactly when it opens an element. Text, comments and
/// declarations follow the element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct MarkupKind(pub u16);

#[allow(clippy::cast_possible_truncation)]
const ELEMENTS: u16 = KEYWORDS.len() as u16;

impl MarkupKind {
    pub const ERROR: Self = Self(0);
    pub const TEXT: Self = Self(2 * ELEMENTS + 1);
    pub const COMMENT: Self = Self(2 * ELEMENTS + 2);
    pub const DECLARATION: Self = Self(2 * ELEMENTS + 3);

    /// Kind of the start tag of `element`, if it is known.
    #[must_use]
    pub fn start_of(element: &[u8]) -> Option<Self> {
        Self::index_of(element).map(|i| Self(2 * i + 2))
    }

    /// Kind of the end tag of `element`, if it is known.
    #[must_use]
    pub fn end_of(element: &[u8]) -> Option<Self> {
        Self::index_of(element).map(|i| Self(2 * i + 1))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn index_of(element: &[u8]) -> Option<u16> {
        let element = core::str::from_utf8(element).ok()?;
        KEYWORDS.binary_search(&element).ok().map(|i| i as u16)
    }

    /// Name of the element this kind opens or closes.
    #[must_use]
    pub fn element(self) -> Option<&'static str> {
        if self.is_element() {
            Some(KEYWORDS[usize::from((self.0 - 1) / 2)])
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_element(self) -> bool {
        self.0 >= 1 && self.0 <= 2 * ELEMENTS
    }

    #[must_use]
    pub fn is_start(self) -> bool {
        self.is_element() && self.0 % 2 == 0
    }

    #[must_use]
    pub fn is_end(self) -> bool {
        self.is_element() && self.0 % 2 == 1
    }
}

impl fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element() {
            Some(name) if self.is_start() => write!(f, "{name}Start"),
            Some(name) => write!(f, "{name}End"),
            None if *self == Self::TEXT => f.write_str("text"),
            None if *self == Self::COMMENT => f.write_str("comment"),
            None if *self == Self::DECLARATION => f.write_str("declaration"),
            None => f.write_str("error"),
        }
    }
}

impl TokenKind for MarkupKind {
    const ERROR: Self = MarkupKind::ERROR;

    fn css_class(self) -> Option<&'static str> {
        (self == Self::ERROR).then_some("markupError")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Text,
    Comment,
    Declaration,
    /// Inside a tag of the given kind, tracking an open attribute quote.
    Tag(MarkupKind, Option<u8>),
}

/// Recognises whole tags of known elements in a document.
///
/// A tag becomes one token covering `<name ... >`; a self-closing tag
/// becomes the start kind over `<name ...` followed by the end kind over
/// `/>`. Unknown elements produce error tokens, and an unknown or end tag
/// closed by `/>` stays a single token.
#[derive(Debug, Default)]
pub struct MarkupLexer {
    state: State,
}

impl MarkupLexer {
    fn text<L: TokenListener<MarkupKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, MarkupKind, L>, b: u8) -> Step {
        if b != b'<' {
            cur.bump_run(|b| b == b'<');
            return Step::Continue;
        }
        let rest = cur.rest();
        let eof = cur.is_eof();
        let Some(markup) = markup_at(rest, eof) else {
            return Step::Incomplete;
        };
        let (skip, kind) = match markup {
            Markup::Comment => (4, None),
            Markup::Declaration => (2, None),
            Markup::StartTag | Markup::EndTag => {
                let skip = if markup == Markup::EndTag { 2 } else { 1 };
                let name = prefix_len(&rest[skip..], is_name_byte);
                if skip + name == rest.len() && !eof {
                    return Step::Incomplete;
                }
                let element = &rest[skip..skip + name];
                let kind = if markup == Markup::EndTag {
                    MarkupKind::end_of(element)
                } else {
                    MarkupKind::start_of(element)
                };
                (skip + name, Some(kind.unwrap_or(MarkupKind::ERROR)))
            }
            Markup::Stray => {
                cur.bump();
                return Step::Continue;
            }
        };
        cur.emit(MarkupKind::TEXT);
        cur.bump_n(skip);
        self.state = match (markup, kind) {
            (Markup::Comment, _) => State::Comment,
            (_, Some(kind)) => State::Tag(kind, None),
            _ => State::Declaration,
        };
        Step::Continue
    }

    fn tag<L: TokenListener<MarkupKind> + ?Sized>(
        &mut self,
        cur: &mut Cursor<'_, MarkupKind, L>,
        b: u8,
        kind: MarkupKind,
        quote: Option<u8>,
    ) -> Step {
        match (quote, b) {
            (Some(q), _) if b == q => {
                cur.bump();
                self.state = State::Tag(kind, None);
            }
            (Some(q), _) => {
                cur.bump_run(|b| b == q);
            }
            (None, b'"' | b'\'') => {
                cur.bump();
                self.state = State::Tag(kind, Some(b));
            }
            (None, b'>') => {
                cur.bump();
                cur.emit(kind);
                self.state = State::Text;
            }
            (None, b'/') => match cur.peek_at(1) {
                None if !cur.is_eof() => return Step::Incomplete,
                Some(b'>') if kind.is_start() => {
                    cur.emit(kind);
                    cur.bump_n(2);
                    cur.emit(MarkupKind(kind.0 - 1));
                    self.state = State::Text;
                }
                // End and error tags take a stray `/>` into the tag token.
                Some(b'>') => {
                    cur.bump_n(2);
                    cur.emit(kind);
                    self.state = State::Text;
                }
                _ => cur.bump(),
            },
            (None, _) => {
                cur.bump_run(|b| matches!(b, b'"' | b'\'' | b'>' | b'/'));
            }
        }
        Step::Continue
    }
}

impl Lexer for MarkupLexer {
    type Kind = MarkupKind;

    const LINE_CONTINUATION: bool = false;

    fn in_flight(&self) -> Option<MarkupKind> {
        Some(match self.state {
            State::Text => MarkupKind::TEXT,
            State::Comment => MarkupKind::COMMENT,
            State::Declaration => MarkupKind::DECLARATION,
            State::Tag(kind, _) => kind,
        })
    }

    fn step<L: TokenListener<MarkupKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, MarkupKind, L>) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        match self.state {
            State::Text => self.text(cur, b),
            State::Comment => {
                if b == b'-' {
                    match comment_close_at(cur.rest(), cur.is_eof()) {
                        None => return Step::Incomplete,
                        Some(true) => {
                            cur.bump_n(3);
                            cur.emit(MarkupKind::COMMENT);
                            self.state = State::Text;
                        }
                        Some(false) => cur.bump(),
                    }
                } else {
                    cur.bump_run(|b| b == b'-');
                }
                Step::Continue
            }
            State::Declaration => {
                if b == b'>' {
                    cur.bump();
                    cur.emit(MarkupKind::DECLARATION);
                    self.state = State::Text;
                } else {
                    cur.bump_run(|b| b == b'>');
                }
                Step::Continue
            }
            State::Tag(kind, quote) => self.tag(cur, b, kind, quote),
        }
    }

    fn line_end(&mut self, _escaped: bool) {}
}

/// Tokenizer for DocBook style documents.
pub type MarkupTokenizer = Engine<MarkupLexer>;

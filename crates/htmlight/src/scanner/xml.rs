use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Cursor, Engine, Lexer, Step, TokenKind, TokenListener, engine::prefix_len};

/// Tokens of XML and HTML markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum XmlKind {
    Error,
    /// Character data between tags.
    Data,
    /// `<!-- ... -->`
    Comment,
    /// `<!DOCTYPE ...>`, `<![CDATA[...]]>` or a processing instruction.
    Declaration,
    /// `<`
    TagOpen,
    /// `</`
    EndTagOpen,
    ElementName,
    AttrName,
    Equals,
    /// Attribute value including its quotes.
    AttrValue,
    /// Blanks inside a tag.
    Space,
    /// `>`
    TagClose,
    /// `/>`
    EmptyTagClose,
}

impl fmt::Display for XmlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Data => "data",
            Self::Comment => "comment",
            Self::Declaration => "declaration",
            Self::TagOpen => "tagOpen",
            Self::EndTagOpen => "endTagOpen",
            Self::ElementName => "elementName",
            Self::AttrName => "attrName",
            Self::Equals => "equals",
            Self::AttrValue => "attrValue",
            Self::Space => "space",
            Self::TagClose => "tagClose",
            Self::EmptyTagClose => "emptyTagClose",
        })
    }
}

impl TokenKind for XmlKind {
    const ERROR: Self = Self::Error;

    fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Error => Some("xmlError"),
            Self::Comment => Some("xmlComment"),
            Self::Declaration => Some("xmlDeclaration"),
            Self::TagOpen | Self::EndTagOpen | Self::TagClose | Self::EmptyTagClose => {
                Some("xmlTag")
            }
            Self::ElementName => Some("xmlElement"),
            Self::AttrName => Some("xmlAttribute"),
            Self::AttrValue => Some("xmlValue"),
            Self::Data | Self::Equals | Self::Space => None,
        }
    }
}

pub(crate) fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

pub(crate) fn is_name_byte(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}

pub(crate) fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// What follows a `<` in character data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Markup {
    Comment,
    Declaration,
    StartTag,
    EndTag,
    /// A `<` that opens nothing.
    Stray,
}

/// Classify the `<` at the start of `rest`; `None` when more bytes are
/// needed.
pub(crate) fn markup_at(rest: &[u8], eof: bool) -> Option<Markup> {
    match rest.get(1) {
        None => eof.then_some(Markup::Stray),
        Some(b'/') => Some(Markup::EndTag),
        Some(b'?') => Some(Markup::Declaration),
        Some(b'!') => {
            if rest.len() < 4 && b"<!--".starts_with(rest) && !eof {
                None
            } else if rest.starts_with(b"<!--") {
                Some(Markup::Comment)
            } else {
                Some(Markup::Declaration)
            }
        }
        Some(&b) if is_name_start(b) => Some(Markup::StartTag),
        Some(_) => Some(Markup::Stray),
    }
}

/// Whether the `-` at the start of `rest` closes a comment; `None` when
/// more bytes are needed.
pub(crate) fn comment_close_at(rest: &[u8], eof: bool) -> Option<bool> {
    if rest.starts_with(b"-->") {
        Some(true)
    } else if rest.len() < 3 && b"-->".starts_with(rest) && !eof {
        None
    } else {
        Some(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Data,
    Comment,
    Declaration,
    /// Right after `<` or `</`.
    TagName,
    Tag,
}

#[derive(Debug, Default)]
pub struct XmlLexer {
    state: State,
    /// The last token inside the tag was `=`.
    after_equals: bool,
}

impl XmlLexer {
    fn data<L: TokenListener<XmlKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, XmlKind, L>, b: u8) -> Step {
        if b != b'<' {
            cur.bump_run(|b| b == b'<');
            return Step::Continue;
        }
        let Some(markup) = markup_at(cur.rest(), cur.is_eof()) else {
            return Step::Incomplete;
        };
        cur.emit(XmlKind::Data);
        match markup {
            Markup::Comment => {
                cur.bump_n(4);
                self.state = State::Comment;
            }
            Markup::Declaration => {
                cur.bump_n(2);
                self.state = State::Declaration;
            }
            Markup::StartTag => {
                cur.bump();
                cur.emit(XmlKind::TagOpen);
                self.state = State::TagName;
            }
            Markup::EndTag => {
                cur.bump_n(2);
                cur.emit(XmlKind::EndTagOpen);
                self.state = State::TagName;
            }
            Markup::Stray => {
                cur.bump();
                cur.emit(XmlKind::Error);
            }
        }
        Step::Continue
    }

    fn tag<L: TokenListener<XmlKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, XmlKind, L>, b: u8) -> Step {
        let rest = cur.rest();
        let eof = cur.is_eof();
        let after_equals = std::mem::take(&mut self.after_equals);
        match b {
            b'>' => {
                cur.bump();
                cur.emit(XmlKind::TagClose);
                self.state = State::Data;
            }
            b'/' => match cur.peek_at(1) {
                None if !eof => {
                    self.after_equals = after_equals;
                    return Step::Incomplete;
                }
                Some(b'>') => {
                    cur.bump_n(2);
                    cur.emit(XmlKind::EmptyTagClose);
                    self.state = State::Data;
                }
                _ => {
                    cur.bump();
                    cur.emit(XmlKind::Error);
                }
            },
            b'=' => {
                cur.bump();
                cur.emit(XmlKind::Equals);
                self.after_equals = true;
            }
            b'"' | b'\'' => {
                let body = prefix_len(&rest[1..], |c| c != b && c != b'\n' && c != b'\r');
                match rest.get(1 + body) {
                    Some(&c) if c == b => {
                        cur.bump_n(body + 2);
                        cur.emit(XmlKind::AttrValue);
                    }
                    Some(_) => {
                        cur.bump_n(body + 1);
                        cur.emit(XmlKind::Error);
                    }
                    None if eof => {
                        cur.bump_n(rest.len());
                        cur.emit(XmlKind::Error);
                    }
                    None => {
                        self.after_equals = after_equals;
                        return Step::Incomplete;
                    }
                }
            }
            _ if after_equals && b != b'<' => {
                let len = prefix_len(rest, |c| !is_blank(c) && c != b'>' && c != b'\n' && c != b'\r');
                if len == rest.len() && !eof {
                    self.after_equals = after_equals;
                    return Step::Incomplete;
                }
                cur.bump_n(len);
                cur.emit(XmlKind::AttrValue);
            }
            _ if is_name_start(b) => {
                let len = prefix_len(rest, is_name_byte);
                if len == rest.len() && !eof {
                    return Step::Incomplete;
                }
                cur.bump_n(len);
                cur.emit(XmlKind::AttrName);
            }
            _ => {
                cur.bump();
                cur.emit(XmlKind::Error);
            }
        }
        Step::Continue
    }
}

impl Lexer for XmlLexer {
    type Kind = XmlKind;

    const LINE_CONTINUATION: bool = false;

    fn in_flight(&self) -> Option<XmlKind> {
        match self.state {
            State::Data => Some(XmlKind::Data),
            State::Comment => Some(XmlKind::Comment),
            State::Declaration => Some(XmlKind::Declaration),
            State::TagName => None,
            State::Tag => Some(XmlKind::Space),
        }
    }

    fn step<L: TokenListener<XmlKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, XmlKind, L>) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        match self.state {
            State::Data => self.data(cur, b),
            State::Comment => {
                if b == b'-' {
                    match comment_close_at(cur.rest(), cur.is_eof()) {
                        None => return Step::Incomplete,
                        Some(true) => {
                            cur.bump_n(3);
                            cur.emit(XmlKind::Comment);
                            self.state = State::Data;
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
                    cur.emit(XmlKind::Declaration);
                    self.state = State::Data;
                } else {
                    cur.bump_run(|b| b == b'>');
                }
                Step::Continue
            }
            State::TagName => {
                let rest = cur.rest();
                let len = prefix_len(rest, is_name_byte);
                if len == rest.len() && !cur.is_eof() {
                    return Step::Incomplete;
                }
                cur.bump_n(len);
                cur.emit(XmlKind::ElementName);
                self.state = State::Tag;
                if len == 0 {
                    return self.step(cur);
                }
                Step::Continue
            }
            State::Tag if is_blank(b) => {
                cur.bump_run(|b| !is_blank(b));
                Step::Continue
            }
            State::Tag => {
                cur.emit(XmlKind::Space);
                self.tag(cur, b)
            }
        }
    }

    fn line_end(&mut self, _escaped: bool) {
        if self.state == State::TagName {
            self.state = State::Tag;
        }
    }
}

/// Tokenizer for XML and HTML.
pub type XmlTokenizer = Engine<XmlLexer>;

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Cursor, Engine, Lexer, Step, TokenKind, TokenListener};

/// Tokens of an Internet message: header fields, then the body after the
/// first empty line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MailKind {
    Error,
    FieldName,
    /// The colon and any blanks following it.
    FieldSeparator,
    FieldBody,
    MessageBody,
}

impl fmt::Display for MailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::FieldName => "fieldName",
            Self::FieldSeparator => "fieldSeparator",
            Self::FieldBody => "fieldBody",
            Self::MessageBody => "messageBody",
        })
    }
}

impl TokenKind for MailKind {
    const ERROR: Self = Self::Error;

    fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Error => Some("mailError"),
            Self::FieldName => Some("mailFieldName"),
            Self::FieldBody => Some("mailFieldBody"),
            Self::MessageBody => Some("mailBody"),
            Self::FieldSeparator => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    LineStart,
    /// Rest of a line already reported as an error.
    Rejected,
    Separator,
    Body,
    Message,
}

#[derive(Debug, Default)]
pub struct MailLexer {
    state: State,
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn is_eol(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

impl MailLexer {
    fn field_name<L: TokenListener<MailKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, MailKind, L>) -> Step {
        let rest = cur.rest();
        let name = rest
            .iter()
            .position(|&b| b == b':' || is_blank(b) || is_eol(b))
            .unwrap_or(rest.len());

        if name > 0 && rest.get(name) == Some(&b':') {
            cur.bump_n(name);
            cur.emit(MailKind::FieldName);
            cur.bump();
            self.state = State::Separator;
            return Step::Continue;
        }
        if name == rest.len() && !cur.is_eof() {
            return Step::Incomplete;
        }

        // Not a header field: the whole line is an error.
        let line = rest.iter().position(|&b| is_eol(b));
        match line {
            Some(len) => cur.bump_n(len),
            None if cur.is_eof() => cur.bump_n(rest.len()),
            None => return Step::Incomplete,
        }
        cur.emit(MailKind::Error);
        self.state = State::Rejected;
        Step::Continue
    }
}

impl Lexer for MailLexer {
    type Kind = MailKind;

    const LINE_CONTINUATION: bool = false;

    fn in_flight(&self) -> Option<MailKind> {
        match self.state {
            State::LineStart | State::Rejected => None,
            State::Separator => Some(MailKind::FieldSeparator),
            State::Body => Some(MailKind::FieldBody),
            State::Message => Some(MailKind::MessageBody),
        }
    }

    fn step<L: TokenListener<MailKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, MailKind, L>) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        match self.state {
            // A line opening with a blank continues the previous field.
            State::LineStart if is_blank(b) => {
                self.state = State::Body;
                cur.bump_run(|_| false);
            }
            State::LineStart => return self.field_name(cur),
            State::Separator if is_blank(b) => {
                cur.bump_run(|b| !is_blank(b));
            }
            State::Separator => {
                cur.emit(MailKind::FieldSeparator);
                self.state = State::Body;
                cur.bump_run(|_| false);
            }
            State::Body | State::Message => {
                cur.bump_run(|_| false);
            }
            State::Rejected => {
                cur.bump_run(|_| false);
                cur.emit(MailKind::Error);
            }
        }
        Step::Continue
    }

    fn line_end(&mut self, _escaped: bool) {
        self.state = match self.state {
            State::LineStart | State::Message => State::Message,
            State::Rejected | State::Separator | State::Body => State::LineStart,
        };
    }
}

/// Tokenizer for RFC 2822 messages.
pub type MailTokenizer = Engine<MailLexer>;

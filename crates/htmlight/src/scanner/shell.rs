use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Cursor, Engine, Lexer, Step, TokenKind, TokenListener, engine::prefix_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShellKind {
    Error,
    /// `#!` interpreter line at the very start of the script.
    Shebang,
    Comment,
    Code,
    /// Single or double quoted string, possibly spanning lines.
    StringLiteral,
    /// `$name`, `${...}` or a special parameter such as `$?`.
    Variable,
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Shebang => "shebang",
            Self::Comment => "comment",
            Self::Code => "code",
            Self::StringLiteral => "stringLiteral",
            Self::Variable => "variable",
        })
    }
}

impl TokenKind for ShellKind {
    const ERROR: Self = Self::Error;

    fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Error => Some("shError"),
            Self::Shebang => Some("shShebang"),
            Self::Comment => Some("shComment"),
            Self::StringLiteral => Some("shString"),
            Self::Variable => Some("shVariable"),
            Self::Code => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Code,
    Shebang,
    Comment,
    SingleQuote,
    DoubleQuote,
}

#[derive(Debug)]
pub struct ShellLexer {
    state: State,
    /// Nothing consumed yet.
    at_start: bool,
    /// The previous byte separates words, so `#` starts a comment.
    word_start: bool,
}

impl Default for ShellLexer {
    fn default() -> Self {
        Self {
            state: State::Code,
            at_start: true,
            word_start: true,
        }
    }
}

fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b';' | b'|' | b'&' | b'(' | b')' | b'<' | b'>')
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Bytes that end a run of plain code.
fn is_code_stop(b: u8) -> bool {
    matches!(b, b'#' | b'\'' | b'"' | b'$' | b'\\') || is_separator(b) || b < 0x20
}

/// Length of the variable reference at the start of `rest` (which begins
/// with `$`). `Some(0)` when the `$` does not start a reference, `None` when
/// the buffer ends before that is known.
fn variable_len(rest: &[u8], eof: bool) -> Option<usize> {
    match rest.get(1) {
        None => eof.then_some(0),
        Some(b'{') => {
            let body = prefix_len(&rest[2..], |b| b != b'}' && b != b'\n' && b != b'\r');
            match rest.get(2 + body) {
                Some(b'}') => Some(3 + body),
                Some(_) => Some(2 + body),
                None => eof.then_some(rest.len()),
            }
        }
        Some(b'@' | b'*' | b'#' | b'?' | b'$' | b'!' | b'-' | b'0'..=b'9') => Some(2),
        Some(&b) if is_name_byte(b) => {
            let name = prefix_len(&rest[1..], is_name_byte);
            (1 + name < rest.len() || eof).then_some(1 + name)
        }
        Some(_) => Some(0),
    }
}

impl ShellLexer {
    fn code<L: TokenListener<ShellKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, ShellKind, L>, b: u8) -> Step {
        match b {
            b'#' if self.at_start => match cur.peek_at(1) {
                None if !cur.is_eof() => return Step::Incomplete,
                Some(b'!') => {
                    cur.bump_n(2);
                    self.state = State::Shebang;
                }
                _ => {
                    cur.bump();
                    self.state = State::Comment;
                }
            },
            b'#' if self.word_start => {
                cur.emit(ShellKind::Code);
                cur.bump();
                self.state = State::Comment;
            }
            b'\'' | b'"' => {
                cur.emit(ShellKind::Code);
                cur.bump();
                self.state = if b == b'"' {
                    State::DoubleQuote
                } else {
                    State::SingleQuote
                };
            }
            b'$' => {
                let Some(len) = variable_len(cur.rest(), cur.is_eof()) else {
                    return Step::Incomplete;
                };
                if len == 0 {
                    cur.bump();
                } else {
                    cur.emit(ShellKind::Code);
                    cur.bump_n(len);
                    cur.emit(ShellKind::Variable);
                }
                self.word_start = false;
            }
            b'\\' => {
                match cur.peek_at(1) {
                    Some(_) => cur.bump_n(2),
                    None if cur.is_eof() => cur.bump(),
                    None => return Step::Incomplete,
                }
                self.word_start = false;
            }
            _ if b < 0x20 && b != b'\t' => {
                cur.emit(ShellKind::Code);
                cur.bump();
                cur.emit(ShellKind::Error);
                self.word_start = true;
            }
            _ if is_separator(b) => {
                cur.bump();
                self.word_start = true;
            }
            _ => {
                cur.bump_run(is_code_stop);
                self.word_start = false;
            }
        }
        self.at_start = false;
        Step::Continue
    }
}

impl Lexer for ShellLexer {
    type Kind = ShellKind;

    const LINE_CONTINUATION: bool = true;

    fn in_flight(&self) -> Option<ShellKind> {
        Some(match self.state {
            State::Code => ShellKind::Code,
            State::Shebang => ShellKind::Shebang,
            State::Comment => ShellKind::Comment,
            State::SingleQuote | State::DoubleQuote => ShellKind::StringLiteral,
        })
    }

    fn step<L: TokenListener<ShellKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, ShellKind, L>) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        match self.state {
            State::Code => return self.code(cur, b),
            State::Shebang | State::Comment => {
                cur.bump_run(|_| false);
            }
            State::SingleQuote => {
                if b == b'\'' {
                    cur.bump();
                    cur.emit(ShellKind::StringLiteral);
                    self.state = State::Code;
                    self.word_start = false;
                } else {
                    cur.bump_run(|b| b == b'\'');
                }
            }
            State::DoubleQuote => match b {
                b'"' => {
                    cur.bump();
                    cur.emit(ShellKind::StringLiteral);
                    self.state = State::Code;
                    self.word_start = false;
                }
                b'\\' => match cur.peek_at(1) {
                    Some(_) => cur.bump_n(2),
                    None if cur.is_eof() => cur.bump(),
                    None => return Step::Incomplete,
                },
                _ => {
                    cur.bump_run(|b| b == b'"' || b == b'\\');
                }
            },
        }
        Step::Continue
    }

    fn line_end(&mut self, _escaped: bool) {
        if matches!(self.state, State::Shebang | State::Comment) {
            self.state = State::Code;
        }
        self.at_start = false;
        self.word_start = true;
    }
}

/// Tokenizer for Bourne shell scripts.
pub type ShellTokenizer = Engine<ShellLexer>;

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Cursor, Engine, Lexer, Step, TokenKind, TokenListener, engine::prefix_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CppKind {
    Error,
    Space,
    /// `/* ... */`, possibly spanning lines.
    Comment,
    /// `// ...` up to the end of the (possibly continued) line.
    LineComment,
    /// `#` and the directive name at the start of a line.
    Preprocessing,
    Keyword,
    Identifier,
    Number,
    StringLiteral,
    CharLiteral,
    Punctuation,
}

impl fmt::Display for CppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Space => "space",
            Self::Comment => "comment",
            Self::LineComment => "lineComment",
            Self::Preprocessing => "preprocessing",
            Self::Keyword => "keyword",
            Self::Identifier => "identifier",
            Self::Number => "number",
            Self::StringLiteral => "stringLiteral",
            Self::CharLiteral => "charLiteral",
            Self::Punctuation => "punctuation",
        })
    }
}

impl TokenKind for CppKind {
    const ERROR: Self = Self::Error;

    fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Error => Some("cppError"),
            Self::Comment | Self::LineComment => Some("cppComment"),
            Self::Preprocessing => Some("cppDirective"),
            Self::Keyword => Some("cppKeyword"),
            Self::Number => Some("cppNumber"),
            Self::StringLiteral | Self::CharLiteral => Some("cppString"),
            Self::Space | Self::Identifier | Self::Punctuation => None,
        }
    }
}

/// Reserved words of C++ (a superset of C's). Sorted for binary search.
pub(crate) const KEYWORDS: &[&str] = &[
    "alignas",
    "alignof",
    "asm",
    "auto",
    "bool",
    "break",
    "case",
    "catch",
    "char",
    "char16_t",
    "char32_t",
    "class",
    "const",
    "const_cast",
    "constexpr",
    "continue",
    "decltype",
    "default",
    "delete",
    "do",
    "double",
    "dynamic_cast",
    "else",
    "enum",
    "explicit",
    "export",
    "extern",
    "false",
    "float",
    "for",
    "friend",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "mutable",
    "namespace",
    "new",
    "noexcept",
    "nullptr",
    "operator",
    "private",
    "protected",
    "public",
    "register",
    "reinterpret_cast",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "static_assert",
    "static_cast",
    "struct",
    "switch",
    "template",
    "this",
    "thread_local",
    "throw",
    "true",
    "try",
    "typedef",
    "typeid",
    "typename",
    "union",
    "unsigned",
    "using",
    "virtual",
    "void",
    "volatile",
    "wchar_t",
    "while",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Code,
    Space,
    BlockComment,
    LineComment,
}

#[derive(Debug)]
pub struct CppLexer {
    state: State,
    /// Only whitespace seen since the last unescaped line terminator.
    line_start: bool,
}

impl Default for CppLexer {
    fn default() -> Self {
        Self {
            state: State::Code,
            line_start: true,
        }
    }
}

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0b | 0x0c)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_byte(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Length of the quoted literal at the start of `rest`, and whether it is
/// terminated. `None` when the buffer ends inside the literal.
fn quoted_len(rest: &[u8], quote: u8, eof: bool) -> Option<(usize, bool)> {
    let mut i = 1;
    while let Some(&b) = rest.get(i) {
        match b {
            b'\n' | b'\r' => return Some((i, false)),
            b'\\' => match rest.get(i + 1) {
                Some(b'\n' | b'\r') => return Some((i, false)),
                Some(_) => i += 2,
                None if eof => return Some((i + 1, false)),
                None => return None,
            },
            _ if b == quote => return Some((i + 1, true)),
            _ => i += 1,
        }
    }
    eof.then_some((rest.len(), false))
}

/// Length of the pp-number at the start of `rest`; `None` when it may
/// continue past the buffer.
fn number_len(rest: &[u8], eof: bool) -> Option<usize> {
    let mut i = 1;
    while let Some(&b) = rest.get(i) {
        let exponent = matches!(rest[i - 1], b'e' | b'E' | b'p' | b'P');
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'\'' {
            i += 1;
        } else if exponent && (b == b'+' || b == b'-') {
            i += 1;
        } else {
            return Some(i);
        }
    }
    eof.then_some(i)
}

impl CppLexer {
    fn code<L: TokenListener<CppKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, CppKind, L>, b: u8) -> Step {
        let rest = cur.rest();
        let eof = cur.is_eof();
        let complete = |len: usize| len < rest.len() || eof;

        match b {
            b'/' => match cur.peek_at(1) {
                None if !eof => return Step::Incomplete,
                Some(b'*') => {
                    cur.bump_n(2);
                    self.state = State::BlockComment;
                }
                Some(b'/') => {
                    cur.bump_n(2);
                    self.state = State::LineComment;
                }
                _ => {
                    cur.bump();
                    cur.emit(CppKind::Punctuation);
                }
            },
            b'#' if self.line_start => {
                let spaces = 1 + prefix_len(&rest[1..], is_blank);
                let name = prefix_len(&rest[spaces..], is_ident_byte);
                if !complete(spaces + name) {
                    return Step::Incomplete;
                }
                cur.bump_n(spaces + name);
                cur.emit(CppKind::Preprocessing);
            }
            b'"' | b'\'' => {
                let Some((len, terminated)) = quoted_len(rest, b, eof) else {
                    return Step::Incomplete;
                };
                cur.bump_n(len);
                cur.emit(match (terminated, b) {
                    (false, _) => CppKind::Error,
                    (true, b'"') => CppKind::StringLiteral,
                    (true, _) => CppKind::CharLiteral,
                });
            }
            b'0'..=b'9' => {
                let Some(len) = number_len(rest, eof) else {
                    return Step::Incomplete;
                };
                cur.bump_n(len);
                cur.emit(CppKind::Number);
            }
            b'.' => match cur.peek_at(1) {
                None if !eof => return Step::Incomplete,
                Some(b'0'..=b'9') => {
                    let Some(len) = number_len(rest, eof) else {
                        return Step::Incomplete;
                    };
                    cur.bump_n(len);
                    cur.emit(CppKind::Number);
                }
                _ => {
                    cur.bump();
                    cur.emit(CppKind::Punctuation);
                }
            },
            _ if is_ident_start(b) => {
                let len = prefix_len(rest, is_ident_byte);
                if !complete(len) {
                    return Step::Incomplete;
                }
                let word = &rest[..len];
                let keyword = core::str::from_utf8(word)
                    .is_ok_and(|word| KEYWORDS.binary_search(&word).is_ok());
                cur.bump_n(len);
                cur.emit(if keyword {
                    CppKind::Keyword
                } else {
                    CppKind::Identifier
                });
            }
            _ if b.is_ascii_punctuation() && b != b'\\' && b != b'@' && b != b'$' && b != b'`' => {
                cur.bump();
                cur.emit(CppKind::Punctuation);
            }
            _ => {
                cur.bump();
                cur.emit(CppKind::Error);
            }
        }
        self.line_start = false;
        Step::Continue
    }
}

impl Lexer for CppLexer {
    type Kind = CppKind;

    const LINE_CONTINUATION: bool = true;

    fn in_flight(&self) -> Option<CppKind> {
        match self.state {
            State::Code => None,
            State::Space => Some(CppKind::Space),
            State::BlockComment => Some(CppKind::Comment),
            State::LineComment => Some(CppKind::LineComment),
        }
    }

    fn step<L: TokenListener<CppKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, CppKind, L>) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        match self.state {
            State::BlockComment => {
                if b == b'*' {
                    match cur.peek_at(1) {
                        None if !cur.is_eof() => return Step::Incomplete,
                        Some(b'/') => {
                            cur.bump_n(2);
                            cur.emit(CppKind::Comment);
                            self.state = State::Code;
                        }
                        _ => cur.bump(),
                    }
                } else {
                    cur.bump_run(|b| b == b'*');
                }
                Step::Continue
            }
            State::LineComment => {
                cur.bump_run(|_| false);
                Step::Continue
            }
            State::Space | State::Code if is_blank(b) => {
                self.state = State::Space;
                cur.bump_run(|b| !is_blank(b));
                Step::Continue
            }
            State::Space | State::Code => {
                cur.emit(CppKind::Space);
                self.state = State::Code;
                self.code(cur, b)
            }
        }
    }

    fn line_end(&mut self, escaped: bool) {
        match self.state {
            State::BlockComment => {}
            State::LineComment if escaped => {}
            State::Space | State::Code | State::LineComment => self.state = State::Code,
        }
        if !escaped {
            self.line_start = true;
        }
    }
}

/// Tokenizer for C and C++ source.
pub type CppTokenizer = Engine<CppLexer>;

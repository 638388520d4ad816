use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Cursor, Engine, Lexer, Step, TokenKind, TokenListener};

/// Tokens of plain text with embedded links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HrefKind {
    Error,
    Text,
    /// An absolute URL such as `https://host/x` or `mailto:a@b`, or a
    /// `www.` host name.
    Url,
    /// A file system path: `/abs`, `./rel`, `../up` or `~/home`.
    Path,
}

impl fmt::Display for HrefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Text => "text",
            Self::Url => "url",
            Self::Path => "path",
        })
    }
}

impl TokenKind for HrefKind {
    const ERROR: Self = Self::Error;

    fn css_class(self) -> Option<&'static str> {
        None
    }
}

const URL_PREFIXES: &[&[u8]] = &[
    b"http://", b"https://", b"ftp://", b"file://", b"mailto:", b"www.",
];

const PATH_PREFIXES: &[&[u8]] = &[b"/", b"./", b"../", b"~/"];

#[derive(Debug)]
pub struct HrefLexer {
    word_start: bool,
}

impl Default for HrefLexer {
    fn default() -> Self {
        Self { word_start: true }
    }
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'<' | b'>' | b'"' | b'\'' | b'`' | b'(' | b'[' | b'{')
        || b == b'\n'
        || b == b'\r'
}

fn could_start_link(b: u8) -> bool {
    matches!(b, b'h' | b'f' | b'm' | b'w' | b'/' | b'.' | b'~')
}

/// Classify `word` and return the length of the link at its start.
///
/// Trailing sentence punctuation is not part of the link.
fn link_in(word: &[u8]) -> Option<(HrefKind, usize)> {
    let mut len = word.len();
    while len > 0 && matches!(word[len - 1], b'.' | b',' | b';' | b':' | b'!' | b'?' | b')' | b']' | b'}') {
        len -= 1;
    }
    let word = &word[..len];
    let longer_than = |prefix: &[u8]| word.starts_with(prefix) && word.len() > prefix.len();
    if URL_PREFIXES.iter().any(|prefix| longer_than(prefix)) {
        Some((HrefKind::Url, len))
    } else if PATH_PREFIXES
        .iter()
        .any(|prefix| longer_than(prefix) && word[prefix.len()].is_ascii_alphanumeric())
    {
        Some((HrefKind::Path, len))
    } else {
        None
    }
}

impl Lexer for HrefLexer {
    type Kind = HrefKind;

    const LINE_CONTINUATION: bool = false;

    fn in_flight(&self) -> Option<HrefKind> {
        Some(HrefKind::Text)
    }

    fn step<L: TokenListener<HrefKind> + ?Sized>(&mut self, cur: &mut Cursor<'_, HrefKind, L>) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        if self.word_start && could_start_link(b) {
            let rest = cur.rest();
            let word = rest
                .iter()
                .position(|&b| is_delimiter(b))
                .unwrap_or(rest.len());
            if word == rest.len() && !cur.is_eof() {
                return Step::Incomplete;
            }
            self.word_start = false;
            if let Some((kind, len)) = link_in(&rest[..word]) {
                cur.emit(HrefKind::Text);
                cur.bump_n(len);
                cur.emit(kind);
                if len < word {
                    cur.bump_n(word - len);
                }
            } else {
                cur.bump_n(word);
            }
            return Step::Continue;
        }

        if is_delimiter(b) {
            cur.bump();
            self.word_start = true;
        } else {
            cur.bump_run(is_delimiter);
            self.word_start = false;
        }
        Step::Continue
    }

    fn line_end(&mut self, _escaped: bool) {
        self.word_start = true;
    }
}

/// Finds URLs and file paths in plain text.
pub type HrefTokenizer = Engine<HrefLexer>;

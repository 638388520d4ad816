use core::ops::Range;

use bstr::ByteSlice;

use super::{Token, TokenListener};

/// One recorded tokenizer event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event<K> {
    Token {
        kind: K,
        text: Vec<u8>,
        fragment: bool,
    },
    Newline(Vec<u8>),
}

/// A [`TokenListener`] that records owned copies of everything it receives.
///
/// Useful for comparing the output of differently chunked runs:
/// [`TokenLog::coalesced`] merges fragments back into whole tokens.
///
/// ```rust
/// use htmlight::scanner::{TokenLog, XmlEscKind, XmlEscTokenizer};
/// use htmlight::Tokenizer;
///
/// let mut tokenizer = XmlEscTokenizer::default();
/// let mut log = TokenLog::default();
/// tokenizer.tokenize(b"a<", &mut log);
/// tokenizer.tokenize(b"b", &mut log);
/// tokenizer.finish(&mut log);
/// assert_eq!(
///     log.tokens(),
///     vec![
///         (XmlEscKind::Data, "a".to_string()),
///         (XmlEscKind::LtEscape, "<".to_string()),
///         (XmlEscKind::Data, "b".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TokenLog<K> {
    events: Vec<Event<K>>,
}

impl<K> Default for TokenLog<K> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<K: Copy + Eq> TokenLog<K> {
    #[must_use]
    pub fn events(&self) -> &[Event<K>] {
        &self.events
    }

    /// Events with fragment runs merged into single final tokens.
    #[must_use]
    pub fn coalesced(&self) -> Vec<Event<K>> {
        let mut merged = Vec::with_capacity(self.events.len());
        let mut open: Option<(K, Vec<u8>)> = None;
        for event in &self.events {
            match event {
                Event::Token {
                    kind,
                    text,
                    fragment,
                } => {
                    let piece = match open.take() {
                        Some((open_kind, mut bytes)) if open_kind == *kind => {
                            bytes.extend_from_slice(text);
                            (open_kind, bytes)
                        }
                        Some(stale) => {
                            merged.push(finished(stale));
                            (*kind, text.clone())
                        }
                        None => (*kind, text.clone()),
                    };
                    if *fragment {
                        open = Some(piece);
                    } else {
                        merged.push(finished(piece));
                    }
                }
                Event::Newline(bytes) => {
                    if let Some(stale) = open.take() {
                        merged.push(finished(stale));
                    }
                    merged.push(Event::Newline(bytes.clone()));
                }
            }
        }
        if let Some(stale) = open {
            merged.push(finished(stale));
        }
        merged
    }

    /// Coalesced tokens as `(kind, text)` pairs, newlines left out.
    #[must_use]
    pub fn tokens(&self) -> Vec<(K, String)> {
        self.coalesced()
            .into_iter()
            .filter_map(|event| match event {
                Event::Token { kind, text, .. } => Some((kind, text.to_str_lossy().into_owned())),
                Event::Newline(_) => None,
            })
            .collect()
    }

    /// Concatenation of every token and newline, in order.
    #[must_use]
    pub fn text(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for event in &self.events {
            match event {
                Event::Token { text, .. } | Event::Newline(text) => out.extend_from_slice(text),
            }
        }
        out
    }
}

fn finished<K>((kind, text): (K, Vec<u8>)) -> Event<K> {
    Event::Token {
        kind,
        text,
        fragment: false,
    }
}

impl<K: Copy> TokenListener<K> for TokenLog<K> {
    fn on_token(&mut self, line: &[u8], token: Token<K>) {
        self.events.push(Event::Token {
            kind: token.kind,
            text: token.text(line).to_vec(),
            fragment: token.fragment,
        });
    }

    fn on_newline(&mut self, line: &[u8], span: Range<usize>) {
        self.events.push(Event::Newline(line[span].to_vec()));
    }
}

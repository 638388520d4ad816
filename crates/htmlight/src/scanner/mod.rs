//! Restartable lexical scanners.
//!
//! Every family is a [`Tokenizer`] built from a small state machine (a
//! [`Lexer`]) driven by the shared [`Engine`]. Callers push bytes with
//! [`Tokenizer::tokenize`] and receive [`Token`]s and newline events through
//! a [`TokenListener`]. The listener is handed the line buffer the token
//! spans refer to, so tokens borrow their text instead of copying it.
//!
//! Tokens whose kind is fixed by their first bytes (data runs, comments,
//! whitespace, message bodies) are delivered as *fragments* when a chunk
//! ends inside them; the closing piece has `fragment == false`. Tokens whose
//! kind depends on their full text (identifiers, numbers, tag names, quoted
//! values, header names) are never split: the unfinished tail is retained and
//! rescanned together with the next chunk.
//!
//! A NUL byte ends the stream: the token in flight is flushed as final,
//! scanning state is reset, and [`Tokenizer::tokenize`] reports how many
//! bytes it consumed before the NUL.

use core::{fmt, ops::Range};

mod cpp;
pub mod engine;
mod href;
mod line_end;
mod log;
mod markup;
mod rfc2822;
mod rfc5545;
mod shell;
mod xml;
mod xml_esc;

#[cfg(test)]
mod tests;

pub use cpp::{CppKind, CppLexer, CppTokenizer};
pub use engine::{Cursor, Engine, Lexer, Step};
pub use href::{HrefKind, HrefLexer, HrefTokenizer};
pub use log::{Event, TokenLog};
pub use markup::{KEYWORDS as MARKUP_ELEMENTS, MarkupKind, MarkupLexer, MarkupTokenizer};
pub use rfc2822::{MailKind, MailLexer, MailTokenizer};
pub use rfc5545::{CalendarKind, CalendarLexer, CalendarTokenizer};
pub use shell::{ShellKind, ShellLexer, ShellTokenizer};
pub use xml::{XmlKind, XmlLexer, XmlTokenizer};
pub use xml_esc::{XmlEscKind, XmlEscLexer, XmlEscTokenizer};

/// A token category of one scanner family.
///
/// Each family's first variant is its error kind; it is produced for input
/// the family does not recognise so that no byte is ever dropped.
pub trait TokenKind: Copy + Eq + fmt::Debug + fmt::Display {
    /// The family's error kind.
    const ERROR: Self;

    /// CSS class used by the span renderers, `None` for plain text.
    fn css_class(self) -> Option<&'static str>;
}

/// A classified span of the line buffer handed to [`TokenListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<K> {
    pub kind: K,
    pub start: usize,
    pub end: usize,
    /// `true` when more bytes of the same token follow in a later call.
    pub fragment: bool,
}

impl<K> Token<K> {
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The token's bytes within `line`.
    #[must_use]
    pub fn text<'a>(&self, line: &'a [u8]) -> &'a [u8] {
        &line[self.start..self.end]
    }
}

/// Receives the output of a [`Tokenizer`].
///
/// Tokens and newlines arrive in input order. `line` is only valid for the
/// duration of the call.
pub trait TokenListener<K> {
    fn on_token(&mut self, line: &[u8], token: Token<K>);

    /// A line terminator (`\n`, `\r\n`, a lone `\r`, or for families with
    /// line continuations a backslash followed by one of those) occupying
    /// `span` of `line`.
    fn on_newline(&mut self, line: &[u8], span: Range<usize>);
}

impl<K, L: TokenListener<K> + ?Sized> TokenListener<K> for &mut L {
    fn on_token(&mut self, line: &[u8], token: Token<K>) {
        (**self).on_token(line, token);
    }

    fn on_newline(&mut self, line: &[u8], span: Range<usize>) {
        (**self).on_newline(line, span);
    }
}

/// A restartable scanner.
pub trait Tokenizer {
    type Kind: TokenKind;

    /// Scan `chunk`, reporting tokens to `listener`.
    ///
    /// Returns the number of bytes consumed: the whole chunk, or the offset
    /// of the first NUL byte, which ends the stream and resets the scanner.
    fn tokenize<L: TokenListener<Self::Kind> + ?Sized>(
        &mut self,
        chunk: &[u8],
        listener: &mut L,
    ) -> usize;

    /// Flush everything retained from earlier chunks as final tokens and
    /// reset the scanner.
    fn finish<L: TokenListener<Self::Kind> + ?Sized>(&mut self, listener: &mut L);

    /// Drop retained input and return to the initial state.
    fn reset(&mut self);
}

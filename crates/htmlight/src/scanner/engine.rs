//! Engine: the chunk driver shared by every scanner family.
//!
//! What it does
//! - Glues the retained tail of the previous chunk to the new chunk and runs
//!   the family's [`Lexer`] over the result, one [`Lexer::step`] at a time.
//! - Recognises line terminators between steps, closes the token in flight
//!   and reports the terminator as a newline event.
//! - When the buffer runs out, delivers the token in flight as a fragment if
//!   its kind is already known ([`Lexer::in_flight`]); otherwise retains the
//!   unfinished bytes for the next call.
//! - Stops at NUL: flushes the token in flight as final and resets.
//!
//! Step contract
//! - A step either consumes at least one byte and returns
//!   [`Step::Continue`], or consumes nothing and returns [`Step::Incomplete`]
//!   because it needs bytes beyond the end of the buffer.
//! - On `Incomplete` the lexer state must describe the scan position: the
//!   bytes from there on are offered again, with more behind them, on the
//!   next call. Tokens emitted before giving up stay emitted.
//! - A step may emit any number of tokens through [`Cursor::emit`]; bytes
//!   consumed but not emitted belong to the lexer's in-flight kind.
//! - When [`Cursor::is_eof`] is set nothing can be incomplete; lookahead
//!   treats the end of the buffer as the end of the token.

use std::borrow::Cow;
use std::marker::PhantomData;

use bstr::ByteSlice;
use tracing::trace;

use super::{
    Token, TokenKind, TokenListener, Tokenizer,
    line_end::{LineEnd, line_end},
};

/// Outcome of a single [`Lexer::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Incomplete,
}

/// A scanner family's state machine.
pub trait Lexer: Default {
    type Kind: TokenKind;

    /// Whether a backslash before a line terminator escapes it.
    const LINE_CONTINUATION: bool;

    /// Kind of the run the lexer is accumulating, if the current state has
    /// one. Consumed but unemitted bytes are reported with this kind at line
    /// ends and, as fragments, at the end of a chunk.
    fn in_flight(&self) -> Option<Self::Kind>;

    /// Advance over the bytes at the cursor. Never called on a line
    /// terminator.
    fn step<L: TokenListener<Self::Kind> + ?Sized>(
        &mut self,
        cur: &mut Cursor<'_, Self::Kind, L>,
    ) -> Step;

    /// A line terminator was consumed; `escaped` for backslash continuations.
    fn line_end(&mut self, escaped: bool);
}

/// View of the working buffer handed to [`Lexer::step`].
///
/// Bytes between the token start and the scan position are the token being
/// built; [`Cursor::emit`] reports them and starts the next token.
pub struct Cursor<'a, K, L: ?Sized> {
    buf: &'a [u8],
    pos: usize,
    start: usize,
    eof: bool,
    continuation: bool,
    listener: &'a mut L,
    _kind: PhantomData<K>,
}

impl<'a, K: TokenKind, L: TokenListener<K> + ?Sized> Cursor<'a, K, L> {
    fn new(buf: &'a [u8], eof: bool, continuation: bool, listener: &'a mut L) -> Self {
        Self {
            buf,
            pos: 0,
            start: 0,
            eof,
            continuation,
            listener,
            _kind: PhantomData,
        }
    }

    /// Byte at the scan position.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Byte `n` positions past the scan position.
    #[must_use]
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.buf.get(self.pos + n).copied()
    }

    /// Unconsumed bytes.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Whether the end of the buffer is the end of the input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Number of bytes consumed for the token being built.
    #[must_use]
    pub fn token_len(&self) -> usize {
        self.pos - self.start
    }

    /// Bytes that end a run: line terminators, and the backslash for
    /// families where it may escape one.
    #[must_use]
    pub fn is_line_byte(&self, b: u8) -> bool {
        b == b'\n' || b == b'\r' || (self.continuation && b == b'\\')
    }

    pub fn bump(&mut self) {
        self.bump_n(1);
    }

    pub fn bump_n(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.buf.len());
        self.pos += n;
    }

    /// Consume the current byte unconditionally, then every following byte
    /// until `stop` matches or a line byte is reached. Returns the number of
    /// bytes consumed.
    pub fn bump_run(&mut self, stop: impl Fn(u8) -> bool) -> usize {
        let begin = self.pos;
        self.bump();
        while let Some(b) = self.peek() {
            if stop(b) || self.is_line_byte(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - begin
    }

    /// Report the bytes consumed since the last emit as a complete token.
    /// Does nothing when no bytes were consumed.
    pub fn emit(&mut self, kind: K) {
        self.emit_piece(kind, false);
    }

    fn emit_piece(&mut self, kind: K, fragment: bool) {
        if self.start < self.pos {
            self.listener.on_token(
                self.buf,
                Token {
                    kind,
                    start: self.start,
                    end: self.pos,
                    fragment,
                },
            );
            self.start = self.pos;
        }
    }

    fn newline(&mut self, len: usize) {
        debug_assert_eq!(self.start, self.pos);
        let span = self.pos..self.pos + len;
        self.pos += len;
        self.start = self.pos;
        self.listener.on_newline(self.buf, span);
    }
}

/// Drives a [`Lexer`] over chunked input. Implements [`Tokenizer`].
#[derive(Debug, Default)]
pub struct Engine<M> {
    lexer: M,
    pending: Vec<u8>,
}

impl<M: Lexer> Engine<M> {
    /// Bytes retained from earlier chunks, awaiting more input.
    #[must_use]
    pub fn retained(&self) -> &[u8] {
        &self.pending
    }

    fn scan<L: TokenListener<M::Kind> + ?Sized>(&mut self, buf: &[u8], eof: bool, listener: &mut L) {
        let mut cur = Cursor::new(buf, eof, M::LINE_CONTINUATION, listener);

        while cur.peek().is_some() {
            match line_end(cur.rest(), M::LINE_CONTINUATION, eof) {
                LineEnd::Incomplete => break,
                LineEnd::Terminator { len, escaped } => {
                    let kind = self.lexer.in_flight().unwrap_or(M::Kind::ERROR);
                    cur.emit(kind);
                    cur.newline(len);
                    self.lexer.line_end(escaped);
                    continue;
                }
                LineEnd::None => {}
            }
            if self.lexer.step(&mut cur) == Step::Incomplete {
                if !eof {
                    break;
                }
                // Lookahead past the end of input: give up one byte as an error.
                let kind = self.lexer.in_flight().unwrap_or(M::Kind::ERROR);
                cur.emit(kind);
                cur.bump();
                cur.emit(M::Kind::ERROR);
            }
        }

        let hold = cur.pos;
        if cur.start < hold {
            let kind = self.lexer.in_flight().unwrap_or(M::Kind::ERROR);
            cur.emit_piece(kind, !eof);
        }

        debug_assert!(self.pending.is_empty());
        if hold < buf.len() {
            trace!(retained = buf.len() - hold, "scanner retained unfinished tail");
            self.pending.extend_from_slice(&buf[hold..]);
        }
    }
}

impl<M: Lexer> Tokenizer for Engine<M> {
    type Kind = M::Kind;

    fn tokenize<L: TokenListener<M::Kind> + ?Sized>(
        &mut self,
        chunk: &[u8],
        listener: &mut L,
    ) -> usize {
        let (body, nul) = match chunk.find_byte(0) {
            Some(at) => (&chunk[..at], Some(at)),
            None => (chunk, None),
        };

        let work: Cow<'_, [u8]> = if self.pending.is_empty() {
            Cow::Borrowed(body)
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(body);
            Cow::Owned(joined)
        };
        self.scan(&work, nul.is_some(), listener);

        match nul {
            Some(at) => {
                trace!(offset = at, "NUL terminated the stream");
                self.reset();
                at
            }
            None => chunk.len(),
        }
    }

    fn finish<L: TokenListener<M::Kind> + ?Sized>(&mut self, listener: &mut L) {
        let work = std::mem::take(&mut self.pending);
        self.scan(&work, true, listener);
        self.reset();
    }

    fn reset(&mut self) {
        self.lexer = M::default();
        self.pending.clear();
    }
}

/// Length of the longest prefix of `bytes` whose bytes all satisfy `pred`.
pub(crate) fn prefix_len(bytes: &[u8], pred: impl Fn(u8) -> bool) -> usize {
    bytes.iter().position(|&b| !pred(b)).unwrap_or(bytes.len())
}

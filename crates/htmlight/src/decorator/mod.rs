//! Output decorators.
//!
//! A [`Decorator`] transforms bytes on their way to a sink. It does not own
//! the sink: [`Decorator::attach`] pairs it with one for the duration of a
//! write session and hands back an [`Attached`] guard implementing
//! [`std::io::Write`]. Detaching flushes the decorator's buffered state,
//! closes anything it left open, and resets it for the next session; the
//! guard detaches on drop if the caller did not.
//!
//! Most decorators are a tokenizer plus a [`TokenRenderer`], glued together
//! by [`Highlight`].

use std::io::{self, Write};
use std::ops::Range;

use bstr::ByteSlice;
use tracing::{debug, trace};

use crate::scanner::{Token, TokenListener, Tokenizer};

mod chain;

#[cfg(test)]
mod tests;

pub use chain::DecoratorChain;

/// A transformer sitting between a writer and its sink.
///
/// The methods take the downstream writer explicitly so that one decorator
/// can serve different sinks over its lifetime. Callers normally go through
/// [`Decorator::attach`] instead of calling them directly.
pub trait Decorator {
    /// Whether the output is HTML markup rather than plain text.
    fn is_formatted(&self) -> bool;

    /// Transform `bytes` into `next`. May buffer.
    fn write_through(&mut self, bytes: &[u8], next: &mut dyn Write) -> io::Result<()>;

    /// Push out everything that can be decided from the input so far.
    fn sync(&mut self, next: &mut dyn Write) -> io::Result<()>;

    /// End of the stream: flush, close open markup and reset.
    fn finish(&mut self, next: &mut dyn Write) -> io::Result<()>;

    /// Start a write session into `sink`.
    fn attach<'a, W: Write>(&'a mut self, sink: &'a mut W) -> Attached<'a, Self, W>
    where
        Self: Sized,
    {
        Attached::new(self, sink)
    }
}

impl<D: Decorator + ?Sized> Decorator for Box<D> {
    fn is_formatted(&self) -> bool {
        (**self).is_formatted()
    }

    fn write_through(&mut self, bytes: &[u8], next: &mut dyn Write) -> io::Result<()> {
        (**self).write_through(bytes, next)
    }

    fn sync(&mut self, next: &mut dyn Write) -> io::Result<()> {
        (**self).sync(next)
    }

    fn finish(&mut self, next: &mut dyn Write) -> io::Result<()> {
        (**self).finish(next)
    }
}

/// A decorator attached to a sink.
///
/// Writes go through the decorator while attached and straight to the sink
/// after [`Attached::detach`]. Detaching twice is a no-op.
pub struct Attached<'a, D: Decorator + ?Sized, W: Write> {
    decorator: &'a mut D,
    sink: &'a mut W,
    attached: bool,
}

impl<'a, D: Decorator + ?Sized, W: Write> Attached<'a, D, W> {
    /// Attach `decorator` to `sink`. Works for unsized decorators such as
    /// `dyn Decorator`, which cannot use [`Decorator::attach`].
    pub fn new(decorator: &'a mut D, sink: &'a mut W) -> Self {
        trace!("decorator attached");
        Self {
            decorator,
            sink,
            attached: true,
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn is_formatted(&self) -> bool {
        self.decorator.is_formatted()
    }

    /// The sink, for callers that need to drain it between writes.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut *self.sink
    }

    /// Flush the decorator into the sink and end the session.
    ///
    /// # Errors
    ///
    /// Propagates write errors from the decorator or the sink.
    pub fn detach(&mut self) -> io::Result<()> {
        if !self.attached {
            return Ok(());
        }
        self.attached = false;
        trace!("decorator detached");
        self.decorator.finish(&mut *self.sink)?;
        self.sink.flush()
    }
}

impl<D: Decorator + ?Sized, W: Write> Write for Attached<'_, D, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.attached {
            self.decorator.write_through(buf, &mut *self.sink)?;
        } else {
            self.sink.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.attached {
            self.decorator.sync(&mut *self.sink)?;
        }
        self.sink.flush()
    }
}

impl<D: Decorator + ?Sized, W: Write> Drop for Attached<'_, D, W> {
    fn drop(&mut self) {
        if let Err(err) = self.detach() {
            debug!(%err, "detach on drop failed");
        }
    }
}

/// Turns tokens into output. The renderer half of a [`Highlight`].
///
/// Fragments of one token arrive as consecutive calls with the same kind;
/// a renderer that wraps tokens in markup should keep the markup open until
/// the final piece so the output does not depend on how input was chunked.
pub trait TokenRenderer<K> {
    fn token(&mut self, out: &mut dyn Write, line: &[u8], token: Token<K>) -> io::Result<()>;

    fn newline(&mut self, out: &mut dyn Write, line: &[u8], span: Range<usize>) -> io::Result<()> {
        out.write_all(&line[span])
    }

    /// End of stream; close whatever is still open.
    fn finish(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

/// A decorator made of a tokenizer and a renderer.
///
/// Input is buffered up to the last complete line, then tokenized; the
/// renderer writes each token downstream. [`Decorator::sync`] also feeds the
/// incomplete last line, leaving only what the tokenizer itself retains.
#[derive(Debug)]
pub struct Highlight<T, R> {
    tokenizer: T,
    renderer: R,
    buffer: Vec<u8>,
    formatted: bool,
}

impl<T: Tokenizer, R: TokenRenderer<T::Kind>> Highlight<T, R> {
    pub fn with_parts(tokenizer: T, renderer: R, formatted: bool) -> Self {
        Self {
            tokenizer,
            renderer,
            buffer: Vec::new(),
            formatted,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn feed(&mut self, upto: usize, next: &mut dyn Write) -> io::Result<()> {
        let Self {
            tokenizer,
            renderer,
            buffer,
            ..
        } = self;
        let mut bridge = Bridge {
            renderer,
            out: next,
            error: None,
        };
        let mut input = &buffer[..upto];
        loop {
            let consumed = tokenizer.tokenize(input, &mut bridge);
            if consumed == input.len() {
                break;
            }
            // A NUL ended the stream; pass it through and start over.
            bridge.out.write_all(b"\0")?;
            input = &input[consumed + 1..];
        }
        buffer.drain(..upto);
        bridge.into_result()
    }
}

impl<T: Tokenizer, R: TokenRenderer<T::Kind>> Decorator for Highlight<T, R> {
    fn is_formatted(&self) -> bool {
        self.formatted
    }

    fn write_through(&mut self, bytes: &[u8], next: &mut dyn Write) -> io::Result<()> {
        self.buffer.extend_from_slice(bytes);
        match self.buffer.rfind_byte(b'\n') {
            Some(last) => self.feed(last + 1, next),
            None => Ok(()),
        }
    }

    fn sync(&mut self, next: &mut dyn Write) -> io::Result<()> {
        self.feed(self.buffer.len(), next)
    }

    fn finish(&mut self, next: &mut dyn Write) -> io::Result<()> {
        let synced = self.sync(next);
        let mut bridge = Bridge {
            renderer: &mut self.renderer,
            out: &mut *next,
            error: None,
        };
        self.tokenizer.finish(&mut bridge);
        let flushed = bridge.into_result();
        let closed = self.renderer.finish(next);
        self.buffer.clear();
        synced.and(flushed).and(closed)
    }
}

/// Adapts a [`TokenRenderer`] to the tokenizer's listener interface,
/// keeping the first write error.
struct Bridge<'a, R> {
    renderer: &'a mut R,
    out: &'a mut dyn Write,
    error: Option<io::Error>,
}

impl<R> Bridge<'_, R> {
    fn into_result(self) -> io::Result<()> {
        self.error.map_or(Ok(()), Err)
    }
}

impl<K, R: TokenRenderer<K>> TokenListener<K> for Bridge<'_, R> {
    fn on_token(&mut self, line: &[u8], token: Token<K>) {
        if self.error.is_none() {
            if let Err(err) = self.renderer.token(&mut *self.out, line, token) {
                self.error = Some(err);
            }
        }
    }

    fn on_newline(&mut self, line: &[u8], span: Range<usize>) {
        if self.error.is_none() {
            if let Err(err) = self.renderer.newline(&mut *self.out, line, span) {
                self.error = Some(err);
            }
        }
    }
}

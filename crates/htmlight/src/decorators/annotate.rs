use std::collections::BTreeMap;
use std::io::{self, Write};
use std::ops::{Range, RangeInclusive};

use super::escape_into;
use crate::decorator::{Highlight, TokenRenderer};
use crate::scanner::{Token, XmlEscKind, XmlEscTokenizer};

/// Per-line markup, by 1-based line number.
pub trait Annotation {
    /// Written before the first byte of `line`.
    fn line_start(&self, _line: usize, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    /// Written after the last byte of `line`, before its terminator.
    fn line_end(&self, _line: usize, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

/// Notes appended to individual lines as `<span class="note">`.
#[derive(Debug, Clone, Default)]
pub struct Notes {
    notes: BTreeMap<usize, String>,
}

impl Notes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: usize, note: impl Into<String>) -> &mut Self {
        self.notes.insert(line, note.into());
        self
    }
}

impl Annotation for Notes {
    fn line_end(&self, line: usize, out: &mut dyn Write) -> io::Result<()> {
        let Some(note) = self.notes.get(&line) else {
            return Ok(());
        };
        out.write_all(b"<span class=\"note\">")?;
        escape_into(out, note.as_bytes())?;
        out.write_all(b"</span>")
    }
}

/// Marks covered lines with `<span class="covered">`.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    ranges: Vec<RangeInclusive<usize>>,
}

impl Coverage {
    pub fn new(ranges: impl IntoIterator<Item = RangeInclusive<usize>>) -> Self {
        Self {
            ranges: ranges.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn covers(&self, line: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(&line))
    }
}

impl Annotation for Coverage {
    fn line_start(&self, line: usize, out: &mut dyn Write) -> io::Result<()> {
        if self.covers(line) {
            out.write_all(b"<span class=\"covered\">")?;
        }
        Ok(())
    }

    fn line_end(&self, line: usize, out: &mut dyn Write) -> io::Result<()> {
        if self.covers(line) {
            out.write_all(b"</span>")?;
        }
        Ok(())
    }
}

/// Renderer copying already escaped text and decorating each line with an
/// [`Annotation`].
#[derive(Debug, Clone)]
pub struct Annotate<A> {
    annotation: A,
    line: usize,
    at_line_start: bool,
}

impl<A> Annotate<A> {
    pub fn new(annotation: A) -> Self {
        Self {
            annotation,
            line: 1,
            at_line_start: true,
        }
    }

    pub fn annotation(&self) -> &A {
        &self.annotation
    }
}

impl<A: Annotation> Annotate<A> {
    fn start_line(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.at_line_start {
            self.at_line_start = false;
            self.annotation.line_start(self.line, out)?;
        }
        Ok(())
    }
}

impl<A: Annotation> TokenRenderer<XmlEscKind> for Annotate<A> {
    fn token(&mut self, out: &mut dyn Write, line: &[u8], token: Token<XmlEscKind>) -> io::Result<()> {
        self.start_line(out)?;
        out.write_all(token.text(line))
    }

    fn newline(&mut self, out: &mut dyn Write, line: &[u8], span: Range<usize>) -> io::Result<()> {
        self.start_line(out)?;
        // A continuation backslash stays with the line it ends.
        let terminator = &line[span];
        let (backslash, terminator) = match terminator.split_first() {
            Some((b'\\', rest)) => (&b"\\"[..], rest),
            _ => (&b""[..], terminator),
        };
        out.write_all(backslash)?;
        self.annotation.line_end(self.line, out)?;
        out.write_all(terminator)?;
        self.line += 1;
        self.at_line_start = true;
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let unterminated = !self.at_line_start;
        let line = self.line;
        self.line = 1;
        self.at_line_start = true;
        if unterminated {
            self.annotation.line_end(line, out)?;
        }
        Ok(())
    }
}

/// Line annotations for text that is already HTML.
///
/// ```rust
/// use std::io::Write;
/// use htmlight::{Decorator, decorators::{LineAnnotator, Notes}};
///
/// let mut notes = Notes::new();
/// notes.insert(2, "check this");
/// let mut annotator = LineAnnotator::new(notes);
/// let mut out = Vec::new();
/// let mut session = annotator.attach(&mut out);
/// session.write_all(b"one\ntwo\n").unwrap();
/// session.detach().unwrap();
/// drop(session);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "one\ntwo<span class=\"note\">check this</span>\n"
/// );
/// ```
pub type LineAnnotator<A> = Highlight<XmlEscTokenizer, Annotate<A>>;

impl<A: Annotation> LineAnnotator<A> {
    pub fn new(annotation: A) -> Self {
        Self::with_parts(XmlEscTokenizer::default(), Annotate::new(annotation), false)
    }
}

//! Side-by-side rendering of a file and a unified diff against it.
//!
//! The original file is one column, the other version is reconstructed from
//! the diff into the second column. Every run of unchanged lines becomes a
//! plain table row; every block of changes becomes a row of its own, classed
//! `diffConflict` when both sides changed and `diffNoConflict` otherwise. The
//! shorter side of a change block is padded with blank lines so both cells
//! span the same number of lines.
//!
//! Each column writes through its own decorator for the whole document, so
//! decorator state (an open comment, a directive) carries over from one row
//! to the next.

use std::borrow::Cow;
use std::io::{self, Write};
use std::mem;

use bstr::ByteSlice;
use tracing::{debug, trace, warn};

use crate::decorator::{Attached, Decorator};
use crate::error::RenderError;
use crate::options::{DiffOptions, OriginalSide};

/// A parsed `@@ -l,c +l,c @@` line. Omitted counts are 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
}

impl HunkHeader {
    #[must_use]
    pub fn parse(line: &[u8]) -> Option<Self> {
        let mut fields = line.strip_prefix(b"@@")?.fields();
        let (old_start, old_len) = parse_range(fields.next()?.strip_prefix(b"-")?)?;
        let (new_start, new_len) = parse_range(fields.next()?.strip_prefix(b"+")?)?;
        if fields.next()? != b"@@" {
            return None;
        }
        Some(Self {
            old_start,
            old_len,
            new_start,
            new_len,
        })
    }
}

fn parse_range(field: &[u8]) -> Option<(usize, usize)> {
    let field = field.to_str().ok()?;
    match field.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((field.parse().ok()?, 1)),
    }
}

/// Expand tabs to the next multiple of `width` columns.
fn expand_tabs(line: &[u8], width: Option<usize>) -> Cow<'_, [u8]> {
    let Some(width) = width.filter(|&w| w > 0) else {
        return Cow::Borrowed(line);
    };
    if !line.contains(&b'\t') {
        return Cow::Borrowed(line);
    }
    let mut expanded = Vec::with_capacity(line.len() + width);
    for &b in line {
        if b == b'\t' {
            let spaces = width - expanded.len() % width;
            expanded.resize(expanded.len() + spaces, b' ');
        } else {
            expanded.push(b);
        }
    }
    Cow::Owned(expanded)
}

/// Renders an original file next to a unified diff against it.
///
/// ```rust
/// use htmlight::{DiffOptions, SideBySide, decorators::HtmlEscaper};
///
/// let mut left = HtmlEscaper::new();
/// let mut right = HtmlEscaper::new();
/// let mut out = Vec::new();
/// SideBySide::new(&mut left, &mut right, DiffOptions::default())
///     .render(b"a\n", b"@@ -1 +1 @@\n-a\n+b\n", &mut out)
///     .unwrap();
/// let html = String::from_utf8(out).unwrap();
/// assert!(html.starts_with("<tr class=\"diffConflict\">\n"));
/// ```
pub struct SideBySide<'a> {
    left: &'a mut dyn Decorator,
    right: &'a mut dyn Decorator,
    options: DiffOptions,
}

impl<'a> SideBySide<'a> {
    pub fn new(left: &'a mut dyn Decorator, right: &'a mut dyn Decorator, options: DiffOptions) -> Self {
        Self {
            left,
            right,
            options,
        }
    }

    /// Render `original` and `diff` as HTML table rows into `out`.
    ///
    /// Malformed diff input is rendered on a best effort basis and logged.
    ///
    /// # Errors
    ///
    /// [`RenderError::Io`] if a decorator or `out` fails to write.
    pub fn render<W: Write>(&mut self, original: &[u8], diff: &[u8], out: &mut W) -> Result<(), RenderError> {
        let side = self.options.original_side;
        let (original_decorator, other_decorator): (&mut dyn Decorator, &mut dyn Decorator) = match side {
            OriginalSide::Left => (&mut *self.left, &mut *self.right),
            OriginalSide::Right => (&mut *self.right, &mut *self.left),
        };
        let mut original_sink = Vec::new();
        let mut other_sink = Vec::new();
        let mut walk = Walk {
            rows: Rows {
                original: Column::new(original_decorator, &mut original_sink),
                other: Column::new(other_decorator, &mut other_sink),
                side,
                tab_width: self.options.tab_width,
                pending: Pending::Nothing,
            },
            lines: original.lines().collect(),
            cursor: 0,
            markers: match side {
                OriginalSide::Left => (b'-', b'+'),
                OriginalSide::Right => (b'+', b'-'),
            },
            remaining: None,
            in_hunk: false,
        };
        for line in diff.lines() {
            walk.line(line, out)?;
        }
        walk.end(out)?;
        Ok(())
    }
}

/// What the columns hold since the last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Nothing,
    Context,
    Block,
}

struct Column<'a> {
    session: Attached<'a, dyn Decorator + 'a, Vec<u8>>,
    /// Lines in the pending change block.
    ahead: usize,
}

impl<'a> Column<'a> {
    fn new(decorator: &'a mut (dyn Decorator + 'a), sink: &'a mut Vec<u8>) -> Self {
        Self {
            session: Attached::new(decorator, sink),
            ahead: 0,
        }
    }

    fn push(&mut self, line: &[u8], tab_width: Option<usize>) -> io::Result<()> {
        let mut text = expand_tabs(line, tab_width).into_owned();
        text.push(b'\n');
        self.session.write_all(&text)
    }

    /// Everything decorated so far.
    fn take(&mut self) -> io::Result<Vec<u8>> {
        self.session.flush()?;
        Ok(mem::take(self.session.sink_mut()))
    }
}

struct Rows<'a> {
    original: Column<'a>,
    other: Column<'a>,
    side: OriginalSide,
    tab_width: Option<usize>,
    pending: Pending,
}

impl Rows<'_> {
    fn context<W: Write>(&mut self, original: &[u8], other: &[u8], out: &mut W) -> io::Result<()> {
        if self.pending == Pending::Block {
            self.flush_block(out)?;
        }
        self.original.push(original, self.tab_width)?;
        self.other.push(other, self.tab_width)?;
        self.pending = Pending::Context;
        Ok(())
    }

    fn change<W: Write>(&mut self, original_side: bool, line: &[u8], out: &mut W) -> io::Result<()> {
        if self.pending == Pending::Context {
            self.flush_context(out)?;
        }
        let tab_width = self.tab_width;
        let column = if original_side { &mut self.original } else { &mut self.other };
        column.push(line, tab_width)?;
        column.ahead += 1;
        self.pending = Pending::Block;
        Ok(())
    }

    fn flush_context<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.pending = Pending::Nothing;
        self.row(None, (0, 0), out)
    }

    fn flush_block<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let (original, other) = (self.original.ahead, self.other.ahead);
        let class = if original > 0 && other > 0 {
            "diffConflict"
        } else {
            "diffNoConflict"
        };
        let rows = original.max(other);
        trace!(original, other, rows, "change block");
        self.original.ahead = 0;
        self.other.ahead = 0;
        self.pending = Pending::Nothing;
        self.row(Some(class), (rows - original, rows - other), out)
    }

    fn row<W: Write>(&mut self, class: Option<&str>, padding: (usize, usize), out: &mut W) -> io::Result<()> {
        let original = self.original.take()?;
        let other = self.other.take()?;
        if original.is_empty() && other.is_empty() {
            return Ok(());
        }
        let original = (original, padding.0, self.original.session.is_formatted());
        let other = (other, padding.1, self.other.session.is_formatted());
        let (left, right) = match self.side {
            OriginalSide::Left => (original, other),
            OriginalSide::Right => (other, original),
        };
        match class {
            Some(class) => writeln!(out, "<tr class=\"{class}\">")?,
            None => out.write_all(b"<tr>\n")?,
        }
        cell(out, left)?;
        cell(out, right)?;
        out.write_all(b"</tr>\n")
    }
}

fn cell<W: Write>(out: &mut W, (text, padding, formatted): (Vec<u8>, usize, bool)) -> io::Result<()> {
    out.write_all(b"<td>")?;
    if formatted {
        out.write_all(b"<pre class=\"code\">\n")?;
    }
    out.write_all(&text)?;
    out.write_all(&b"\n".repeat(padding))?;
    if formatted {
        out.write_all(b"</pre>")?;
    }
    out.write_all(b"</td>\n")
}

struct Walk<'a, 'f> {
    rows: Rows<'a>,
    lines: Vec<&'f [u8]>,
    /// Index of the next unread original line.
    cursor: usize,
    /// Diff markers of the original and the other side.
    markers: (u8, u8),
    /// Lines left in the current hunk, original and other side, when the
    /// header carried counts.
    remaining: Option<(usize, usize)>,
    in_hunk: bool,
}

impl Walk<'_, '_> {
    fn line<W: Write>(&mut self, line: &[u8], out: &mut W) -> io::Result<()> {
        if line.starts_with(b"@@") {
            return self.hunk(line, out);
        }
        match self.remaining {
            Some((0, 0)) | None if !self.in_hunk => {
                trace!(line = %line.as_bstr(), "outside of a hunk");
                Ok(())
            }
            Some((0, 0)) => {
                self.in_hunk = false;
                trace!(line = %line.as_bstr(), "after the end of a hunk");
                Ok(())
            }
            None if line.starts_with(b"---") || line.starts_with(b"+++") => {
                self.in_hunk = false;
                Ok(())
            }
            _ => self.body(line, out),
        }
    }

    fn hunk<W: Write>(&mut self, line: &[u8], out: &mut W) -> io::Result<()> {
        if self.rows.pending == Pending::Block {
            self.rows.flush_block(out)?;
        }
        self.in_hunk = true;
        let Some(header) = HunkHeader::parse(line) else {
            warn!(header = %line.as_bstr(), "malformed hunk header, continuing at line {}", self.cursor + 1);
            self.remaining = None;
            return Ok(());
        };
        let (start, len, other_len) = match self.rows.side {
            OriginalSide::Left => (header.old_start, header.old_len, header.new_len),
            OriginalSide::Right => (header.new_start, header.new_len, header.old_len),
        };
        // An empty range names the line before the hunk.
        let first = if len == 0 { start + 1 } else { start };
        debug!(first, len, other_len, "hunk");
        self.remaining = Some((len, other_len));
        while self.cursor + 1 < first && self.cursor < self.lines.len() {
            let text = self.lines[self.cursor];
            self.cursor += 1;
            self.rows.context(text, text, out)?;
        }
        Ok(())
    }

    fn next_original(&mut self, fallback: &'_ [u8]) -> Vec<u8> {
        match self.lines.get(self.cursor) {
            Some(line) => {
                self.cursor += 1;
                line.to_vec()
            }
            None => {
                warn!(line = self.cursor + 1, "diff refers past the end of the original");
                fallback.to_vec()
            }
        }
    }

    fn count(&mut self, original: bool, other: bool) {
        if let Some((left, right)) = &mut self.remaining {
            if original {
                *left = left.saturating_sub(1);
            }
            if other {
                *right = right.saturating_sub(1);
            }
        }
    }

    fn body<W: Write>(&mut self, line: &[u8], out: &mut W) -> io::Result<()> {
        let (original_marker, other_marker) = self.markers;
        let text = line.get(1..).unwrap_or_default();
        match line.first().copied() {
            Some(marker) if marker == original_marker => {
                self.count(true, false);
                let original = self.next_original(text);
                self.rows.change(true, &original, out)
            }
            Some(marker) if marker == other_marker => {
                self.count(false, true);
                self.rows.change(false, text, out)
            }
            Some(b' ') | None => {
                self.count(true, true);
                let original = self.next_original(text);
                self.rows.context(&original, text, out)
            }
            Some(b'\\') => Ok(()),
            Some(_) => {
                warn!(line = %line.as_bstr(), "unexpected line inside a hunk");
                self.rows.context(line, line, out)
            }
        }
    }

    fn end<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.rows.pending == Pending::Block {
            self.rows.flush_block(out)?;
        }
        while self.cursor < self.lines.len() {
            let text = self.lines[self.cursor];
            self.cursor += 1;
            self.rows.context(text, text, out)?;
        }
        // Whatever the decorators close at the end belongs to the last row.
        self.rows.original.session.detach()?;
        self.rows.other.session.detach()?;
        self.rows.flush_context(out)
    }
}

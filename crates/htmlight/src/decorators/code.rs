use std::io::{self, Write};
use std::ops::Range;

use super::escape_into;
use crate::decorator::{Highlight, TokenRenderer};
use crate::scanner::{CppKind, CppTokenizer, Token, TokenKind, Tokenizer};

/// Renderer wrapping each token in `<span class="...">` by its kind's CSS
/// class, with the text escaped. Kinds without a class are written bare.
///
/// A span opened for a fragment stays open for the following pieces of the
/// same token and is closed by the final piece, a different kind, a newline
/// or the end of the stream.
#[derive(Debug, Clone)]
pub struct ClassSpans<K> {
    open: Option<K>,
}

impl<K> Default for ClassSpans<K> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<K: TokenKind> ClassSpans<K> {
    fn piece(&mut self, out: &mut dyn Write, text: &[u8], kind: K, fragment: bool) -> io::Result<()> {
        if self.open != Some(kind) {
            self.close(out)?;
            if let Some(class) = kind.css_class() {
                write!(out, "<span class=\"{class}\">")?;
                self.open = Some(kind);
            }
        }
        escape_into(out, text)?;
        if !fragment {
            self.close(out)?;
        }
        Ok(())
    }

    fn close(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.open.take().is_some() {
            out.write_all(b"</span>")?;
        }
        Ok(())
    }
}

impl<K: TokenKind> TokenRenderer<K> for ClassSpans<K> {
    fn token(&mut self, out: &mut dyn Write, line: &[u8], token: Token<K>) -> io::Result<()> {
        self.piece(out, token.text(line), token.kind, token.fragment)
    }

    fn newline(&mut self, out: &mut dyn Write, line: &[u8], span: Range<usize>) -> io::Result<()> {
        self.close(out)?;
        escape_into(out, &line[span])
    }

    fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        self.close(out)
    }
}

/// Syntax highlighting by CSS class for any tokenizer family.
///
/// ```rust
/// use std::io::Write;
/// use htmlight::{Decorator, decorators::CodeHighlight, scanner::ShellTokenizer};
///
/// let mut shell = CodeHighlight::<ShellTokenizer>::new();
/// let mut out = Vec::new();
/// let mut session = shell.attach(&mut out);
/// session.write_all(b"echo $HOME # home\n").unwrap();
/// session.detach().unwrap();
/// drop(session);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "echo <span class=\"shVariable\">$HOME</span> <span class=\"shComment\"># home</span>\n"
/// );
/// ```
pub type CodeHighlight<T> = Highlight<T, ClassSpans<<T as Tokenizer>::Kind>>;

impl<T: Tokenizer + Default> Highlight<T, ClassSpans<T::Kind>> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(T::default(), ClassSpans::default(), true)
    }
}

impl<T: Tokenizer + Default> Default for Highlight<T, ClassSpans<T::Kind>> {
    fn default() -> Self {
        Self::new()
    }
}

/// Renderer for C and C++ source.
///
/// Class spans as in [`ClassSpans`]; in addition a whole preprocessing
/// directive, including its continuation lines, is wrapped in
/// `<span class="cppPreprocessor">`. The wrapper is closed before and
/// reopened after each escaped line break so every line stays well formed.
#[derive(Debug, Clone, Default)]
pub struct CppRenderer {
    spans: ClassSpans<CppKind>,
    directive: bool,
    /// The directive wrapper was closed at an escaped line break.
    soft_break: bool,
}

const DIRECTIVE_OPEN: &[u8] = b"<span class=\"cppPreprocessor\">";

impl TokenRenderer<CppKind> for CppRenderer {
    fn token(&mut self, out: &mut dyn Write, line: &[u8], token: Token<CppKind>) -> io::Result<()> {
        if token.kind == CppKind::Preprocessing && !self.directive {
            out.write_all(DIRECTIVE_OPEN)?;
            self.directive = true;
        } else if self.soft_break {
            out.write_all(DIRECTIVE_OPEN)?;
        }
        self.soft_break = false;
        self.spans.token(out, line, token)
    }

    fn newline(&mut self, out: &mut dyn Write, line: &[u8], span: Range<usize>) -> io::Result<()> {
        let escaped = line[span.start] == b'\\';
        self.spans.close(out)?;
        if self.directive && !self.soft_break {
            out.write_all(b"</span>")?;
        }
        if self.directive {
            self.directive = escaped;
            self.soft_break = escaped;
        }
        escape_into(out, &line[span])
    }

    fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        self.spans.close(out)?;
        if self.directive && !self.soft_break {
            out.write_all(b"</span>")?;
        }
        self.directive = false;
        self.soft_break = false;
        Ok(())
    }
}

/// C/C++ syntax highlighting.
pub type CppLight = Highlight<CppTokenizer, CppRenderer>;

impl CppLight {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(CppTokenizer::default(), CppRenderer::default(), true)
    }
}

impl Default for CppLight {
    fn default() -> Self {
        Self::new()
    }
}

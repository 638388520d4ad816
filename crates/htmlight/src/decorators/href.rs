use std::io::{self, Write};

use super::escape_into;
use crate::context::RenderContext;
use crate::decorator::{Highlight, TokenRenderer};
use crate::scanner::{HrefKind, HrefTokenizer, Token};

/// Renderer turning URLs and paths in plain text into anchors. The
/// surrounding text is escaped.
///
/// With a [`RenderContext`] each target is recorded in its link set and the
/// anchor carries the link's class.
#[derive(Debug, Clone, Default)]
pub struct HrefRenderer {
    context: Option<RenderContext>,
}

impl HrefRenderer {
    #[must_use]
    pub fn new(context: Option<RenderContext>) -> Self {
        Self { context }
    }

    fn anchor(&self, out: &mut dyn Write, kind: HrefKind, text: &[u8]) -> io::Result<()> {
        let mut target = Vec::with_capacity(text.len() + 7);
        if kind == HrefKind::Url && text.starts_with(b"www.") {
            target.extend_from_slice(b"http://");
        }
        target.extend_from_slice(text);

        let class = self
            .context
            .as_ref()
            .zip(std::str::from_utf8(&target).ok())
            .map(|(context, link)| context.classify(link));
        match class {
            Some(class) => write!(out, "<a class=\"{}\" href=\"", class.css_class())?,
            None => out.write_all(b"<a href=\"")?,
        }
        escape_into(out, &target)?;
        out.write_all(b"\">")?;
        escape_into(out, text)?;
        out.write_all(b"</a>")
    }
}

impl TokenRenderer<HrefKind> for HrefRenderer {
    fn token(&mut self, out: &mut dyn Write, line: &[u8], token: Token<HrefKind>) -> io::Result<()> {
        let text = token.text(line);
        match token.kind {
            HrefKind::Url | HrefKind::Path => self.anchor(out, token.kind, text),
            HrefKind::Text | HrefKind::Error => escape_into(out, text),
        }
    }
}

/// Links URLs and paths found in plain text.
///
/// ```rust
/// use std::io::Write;
/// use htmlight::{Decorator, decorators::HrefLight};
///
/// let mut href = HrefLight::new(None);
/// let mut out = Vec::new();
/// let mut session = href.attach(&mut out);
/// session.write_all(b"see www.example.com.\n").unwrap();
/// session.detach().unwrap();
/// drop(session);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "see <a href=\"http://www.example.com\">www.example.com</a>.\n"
/// );
/// ```
pub type HrefLight = Highlight<HrefTokenizer, HrefRenderer>;

impl HrefLight {
    #[must_use]
    pub fn new(context: Option<RenderContext>) -> Self {
        Self::with_parts(HrefTokenizer::default(), HrefRenderer::new(context), false)
    }
}

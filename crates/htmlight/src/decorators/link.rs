use std::io::{self, Write};

use tracing::warn;
use url::Url;

use super::escape_into;
use crate::context::{LinkClass, RenderContext};
use crate::decorator::{Highlight, TokenRenderer};
use crate::error::RenderError;
use crate::options::LinkPolicy;
use crate::scanner::{Token, XmlKind, XmlTokenizer};

/// Outcome of [`LinkRenderer::decorate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// The caller writes the original attribute value.
    Copy,
    /// A replacement value was written; the original must be dropped.
    Replaced,
}

#[derive(Debug, Clone)]
enum Rewrite {
    Classify,
    Absolute(Url),
    Cached(String),
}

/// Position inside the tag being scanned.
#[derive(Debug, Clone, Copy, Default)]
struct Tag {
    /// The next element name opens a tag (as opposed to closing one).
    opening: bool,
    anchor: bool,
    /// The last attribute name was `href` on an anchor.
    href: bool,
    class: Option<LinkClass>,
}

/// Renderer finding the `href` of every `<a>` in HTML and applying a
/// [`LinkPolicy`] to it. Everything else is copied unchanged.
#[derive(Debug, Clone)]
pub struct LinkRenderer {
    context: RenderContext,
    rewrite: Rewrite,
    tag: Tag,
}

impl LinkRenderer {
    /// # Errors
    ///
    /// [`RenderError::InvalidUrl`] if the base of [`LinkPolicy::Absolute`]
    /// is not an absolute URL.
    pub fn new(context: RenderContext, policy: &LinkPolicy) -> Result<Self, RenderError> {
        let rewrite = match policy {
            LinkPolicy::Classify => Rewrite::Classify,
            LinkPolicy::Absolute { base } => {
                let parsed = Url::parse(base).map_err(|source| RenderError::InvalidUrl {
                    url: base.clone(),
                    source,
                })?;
                Rewrite::Absolute(parsed)
            }
            LinkPolicy::Cached { suffix } => Rewrite::Cached(suffix.clone()),
        };
        Ok(Self {
            context,
            rewrite,
            tag: Tag::default(),
        })
    }

    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Record `url` in the context and apply the policy.
    ///
    /// A rewritten target is written to `out` as a complete quoted attribute
    /// value. With [`LinkPolicy::Classify`] nothing is written here; the
    /// class attribute is added when the tag closes.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn decorate(&mut self, out: &mut dyn Write, url: &str) -> io::Result<LinkAction> {
        let class = self.context.classify(url);
        match &self.rewrite {
            Rewrite::Classify => {
                self.tag.class = Some(class);
                Ok(LinkAction::Copy)
            }
            Rewrite::Absolute(base) if class != LinkClass::Remote => match base.join(url) {
                Ok(absolute) => {
                    out.write_all(b"\"")?;
                    escape_into(out, absolute.as_str().as_bytes())?;
                    out.write_all(b"\"")?;
                    Ok(LinkAction::Replaced)
                }
                Err(err) => {
                    warn!(url, %err, "cannot resolve link against base");
                    Ok(LinkAction::Copy)
                }
            },
            Rewrite::Cached(suffix) if class == LinkClass::LocalFileExists => {
                out.write_all(b"\"")?;
                escape_into(out, url.as_bytes())?;
                escape_into(out, suffix.as_bytes())?;
                out.write_all(b"\"")?;
                Ok(LinkAction::Replaced)
            }
            Rewrite::Absolute(_) | Rewrite::Cached(_) => Ok(LinkAction::Copy),
        }
    }
}

fn unquote(value: &[u8]) -> &[u8] {
    match value {
        [open @ (b'"' | b'\''), inner @ .., close] if open == close => inner,
        _ => value,
    }
}

impl TokenRenderer<XmlKind> for LinkRenderer {
    fn token(&mut self, out: &mut dyn Write, line: &[u8], token: Token<XmlKind>) -> io::Result<()> {
        let text = token.text(line);
        match token.kind {
            XmlKind::TagOpen => {
                self.tag = Tag {
                    opening: true,
                    ..Tag::default()
                };
            }
            XmlKind::EndTagOpen => self.tag = Tag::default(),
            XmlKind::ElementName if self.tag.opening => {
                self.tag.opening = false;
                self.tag.anchor = text.eq_ignore_ascii_case(b"a");
            }
            XmlKind::AttrName => {
                self.tag.href = self.tag.anchor && text.eq_ignore_ascii_case(b"href");
            }
            XmlKind::AttrValue if self.tag.href => {
                self.tag.href = false;
                if let Ok(url) = std::str::from_utf8(unquote(text)) {
                    if self.decorate(out, url)? == LinkAction::Replaced {
                        return Ok(());
                    }
                }
            }
            XmlKind::TagClose | XmlKind::EmptyTagClose => {
                if let Some(class) = self.tag.class.take() {
                    write!(out, " class=\"{}\"", class.css_class())?;
                }
                self.tag = Tag::default();
            }
            _ => {}
        }
        out.write_all(text)
    }

    fn finish(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        self.tag = Tag::default();
        Ok(())
    }
}

/// Link checking and rewriting for HTML. Not formatted: the output is the
/// input document with its anchors adjusted.
///
/// ```rust
/// use std::io::Write;
/// use htmlight::{Decorator, LinkClass, LinkPolicy, RenderContext, decorators::LinkLight};
///
/// let context = RenderContext::new(|_: &str| LinkClass::Remote);
/// let mut links = LinkLight::new(context, &LinkPolicy::Classify).unwrap();
/// let mut out = Vec::new();
/// let mut session = links.attach(&mut out);
/// session.write_all(b"<a href=\"https://example.com/\">x</a>\n").unwrap();
/// session.detach().unwrap();
/// drop(session);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "<a href=\"https://example.com/\" class=\"linkExternal\">x</a>\n"
/// );
/// ```
pub type LinkLight = Highlight<XmlTokenizer, LinkRenderer>;

impl LinkLight {
    /// # Errors
    ///
    /// See [`LinkRenderer::new`].
    pub fn new(context: RenderContext, policy: &LinkPolicy) -> Result<Self, RenderError> {
        let renderer = LinkRenderer::new(context, policy)?;
        Ok(Self::with_parts(XmlTokenizer::default(), renderer, false))
    }
}

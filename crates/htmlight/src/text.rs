use std::io::Write;

use crate::decorator::{Attached, Decorator};
use crate::error::RenderError;

/// Write a whole document through `decorator` into `out`.
///
/// Formatted output is wrapped in `<pre class="code">`.
///
/// ```rust
/// use htmlight::{render_text, decorators::HtmlEscaper};
///
/// let mut out = Vec::new();
/// render_text(b"1 < 2\n", &mut HtmlEscaper::new(), &mut out).unwrap();
/// assert_eq!(out, b"<pre class=\"code\">\n1 &lt; 2\n</pre>\n");
/// ```
///
/// # Errors
///
/// [`RenderError::Io`] if the decorator or `out` fails to write.
pub fn render_text<D, W>(input: &[u8], decorator: &mut D, out: &mut W) -> Result<(), RenderError>
where
    D: Decorator + ?Sized,
    W: Write,
{
    let formatted = decorator.is_formatted();
    if formatted {
        out.write_all(b"<pre class=\"code\">\n")?;
    }
    let mut session = Attached::new(decorator, &mut *out);
    session.write_all(input)?;
    session.detach()?;
    drop(session);
    if formatted {
        out.write_all(b"</pre>\n")?;
    }
    Ok(())
}

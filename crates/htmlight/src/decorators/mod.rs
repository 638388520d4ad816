//! Concrete decorators.

mod annotate;
mod code;
mod escape;
mod href;
mod link;

pub use annotate::{Annotate, Annotation, Coverage, LineAnnotator, Notes};
pub use code::{ClassSpans, CodeHighlight, CppLight, CppRenderer};
pub use escape::{Escape, HtmlEscaper, escape_into};
pub use href::{HrefLight, HrefRenderer};
pub use link::{LinkAction, LinkLight, LinkRenderer};

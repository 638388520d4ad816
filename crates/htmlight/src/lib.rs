//! Streaming syntax highlighting and side-by-side diff rendering to HTML.
//!
//! The crate is organised in three layers:
//!
//! - [`scanner`]: restartable byte-level tokenizers. Input may be fed in
//!   arbitrary chunks; the token stream is the same (modulo fragment merging)
//!   as when the whole input is fed at once.
//! - [`decorator`] / [`decorators`]: output transformers that sit between a
//!   writer and its sink. A [`Decorator`] is attached to a sink with
//!   [`Decorator::attach`] and rewrites everything written through it, for
//!   example HTML escaping or syntax highlighting. Decorators compose with
//!   [`DecoratorChain`].
//! - [`diff`]: renders an original file together with a unified diff as an
//!   HTML table, one row per aligned block.
//!
//! ```rust
//! use std::io::Write;
//! use htmlight::{Decorator, decorators::HtmlEscaper};
//!
//! let mut escaper = HtmlEscaper::new();
//! let mut out = Vec::new();
//! {
//!     let mut session = escaper.attach(&mut out);
//!     session.write_all(b"a<b").unwrap();
//!     session.detach().unwrap();
//! }
//! assert_eq!(out, b"a&lt;b");
//! ```

pub mod chunk_utils;
pub mod context;
pub mod decorator;
pub mod decorators;
pub mod diff;
mod error;
mod options;
pub mod scanner;
mod text;

#[cfg(test)]
mod tests;

pub use context::{FsResolver, LinkClass, LinkResolver, LinkSet, RenderContext};
pub use decorator::{Attached, Decorator, DecoratorChain, Highlight, TokenRenderer};
pub use diff::SideBySide;
pub use error::RenderError;
pub use options::{DiffOptions, LinkPolicy, OriginalSide};
pub use scanner::{Token, TokenKind, TokenListener, Tokenizer};
pub use text::render_text;

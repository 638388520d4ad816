use std::io::{self, Write};

use tracing::trace;

use super::Decorator;

/// An ordered composition of decorators, itself a decorator.
///
/// Bytes written to the chain pass through the members front to back: the
/// output of each member is the input of the next, and the last member
/// writes to the sink. An empty chain passes bytes through unchanged.
///
/// ```rust
/// use std::io::Write;
/// use htmlight::{Decorator, DecoratorChain, decorators::HtmlEscaper};
///
/// let mut chain = DecoratorChain::new();
/// chain.push_back(HtmlEscaper::new());
/// let mut out = Vec::new();
/// let mut session = chain.attach(&mut out);
/// session.write_all(b"<b>\n").unwrap();
/// session.detach().unwrap();
/// drop(session);
/// assert_eq!(out, b"&lt;b&gt;\n");
/// ```
#[derive(Default)]
pub struct DecoratorChain<'a> {
    members: Vec<Box<dyn Decorator + 'a>>,
}

impl<'a> DecoratorChain<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member; it receives the output of the members before it.
    pub fn push_back(&mut self, decorator: impl Decorator + 'a) -> &mut Self {
        self.members.push(Box::new(decorator));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Run `op` on every member in order, each writing into the rest of the
    /// chain. Keeps going after an error and reports the first one.
    fn each(
        &mut self,
        next: &mut dyn Write,
        op: impl Fn(&mut dyn Decorator, &mut dyn Write) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut result = Ok(());
        for at in 0..self.members.len() {
            let Some((head, rest)) = self.members[at..].split_first_mut() else {
                break;
            };
            let mut downstream = Downstream {
                members: rest,
                next: &mut *next,
            };
            let outcome = op(head.as_mut(), &mut downstream);
            if result.is_ok() {
                result = outcome;
            }
        }
        result
    }
}

impl Decorator for DecoratorChain<'_> {
    fn is_formatted(&self) -> bool {
        self.members.iter().any(|member| member.is_formatted())
    }

    fn write_through(&mut self, bytes: &[u8], next: &mut dyn Write) -> io::Result<()> {
        Downstream {
            members: &mut self.members,
            next,
        }
        .write_all(bytes)
    }

    fn sync(&mut self, next: &mut dyn Write) -> io::Result<()> {
        self.each(next, |member, downstream| member.sync(downstream))
    }

    fn finish(&mut self, next: &mut dyn Write) -> io::Result<()> {
        trace!(members = self.members.len(), "finishing decorator chain");
        self.each(next, |member, downstream| member.finish(downstream))
    }
}

/// The part of a chain after some member, as a writer.
struct Downstream<'c, 'a> {
    members: &'c mut [Box<dyn Decorator + 'a>],
    next: &'c mut dyn Write,
}

impl Write for Downstream<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.members.split_first_mut() {
            Some((head, rest)) => head.write_through(
                buf,
                &mut Downstream {
                    members: rest,
                    next: &mut *self.next,
                },
            )?,
            None => self.next.write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.next.flush()
    }
}

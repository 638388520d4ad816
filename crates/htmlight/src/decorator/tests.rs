use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::decorators::{HtmlEscaper, LineAnnotator, Notes};
use crate::{Decorator, DecoratorChain};

/// Passes bytes through unchanged and records every call.
struct Recorder {
    name: &'static str,
    calls: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn new(name: &'static str, calls: &Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            name,
            calls: Rc::clone(calls),
        }
    }

    fn record(&self, what: &str) {
        self.calls.borrow_mut().push(format!("{}.{what}", self.name));
    }
}

impl Decorator for Recorder {
    fn is_formatted(&self) -> bool {
        false
    }

    fn write_through(&mut self, bytes: &[u8], next: &mut dyn Write) -> io::Result<()> {
        self.record("write");
        next.write_all(bytes)
    }

    fn sync(&mut self, _next: &mut dyn Write) -> io::Result<()> {
        self.record("sync");
        Ok(())
    }

    fn finish(&mut self, next: &mut dyn Write) -> io::Result<()> {
        self.record("finish");
        write!(next, "[{}]", self.name)
    }
}

fn note_on_first_line() -> Notes {
    let mut notes = Notes::new();
    notes.insert(1, "n");
    notes
}

#[test]
fn detach_is_idempotent() {
    let mut escaper = HtmlEscaper::new();
    let mut out = Vec::new();
    let mut session = escaper.attach(&mut out);
    session.write_all(b"<").unwrap();
    session.detach().unwrap();
    session.detach().unwrap();
    assert!(!session.is_attached());
    session.write_all(b"<").unwrap();
    drop(session);
    assert_eq!(out, b"&lt;<");
}

#[test]
fn drop_detaches() {
    let mut escaper = HtmlEscaper::new();
    let mut out = Vec::new();
    {
        let mut session = escaper.attach(&mut out);
        session.write_all(b"a<b").unwrap();
    }
    assert_eq!(out, b"a&lt;b");
}

#[test]
fn flush_pushes_incomplete_line() {
    let mut escaper = HtmlEscaper::new();
    let mut out = Vec::new();
    let mut session = escaper.attach(&mut out);
    session.write_all(b"x>").unwrap();
    session.flush().unwrap();
    assert_eq!(session.sink_mut().as_slice(), b"x&gt;");
}

#[test]
fn decorator_is_reusable_after_detach() {
    let mut escaper = HtmlEscaper::new();
    for _ in 0..2 {
        let mut out = Vec::new();
        let mut session = escaper.attach(&mut out);
        session.write_all(b"\"q\"\n").unwrap();
        session.detach().unwrap();
        drop(session);
        assert_eq!(out, b"&quot;q&quot;\n");
    }
}

#[test]
fn nul_passes_through_and_restarts() {
    let mut escaper = HtmlEscaper::new();
    let mut out = Vec::new();
    let mut session = escaper.attach(&mut out);
    session.write_all(b"<\0>\n").unwrap();
    session.detach().unwrap();
    drop(session);
    assert_eq!(out, b"&lt;\0&gt;\n");
}

#[test]
fn empty_chain_passes_bytes_through() {
    let mut chain = DecoratorChain::new();
    assert!(chain.is_empty());
    assert!(!chain.is_formatted());
    let mut out = Vec::new();
    let mut session = chain.attach(&mut out);
    session.write_all(b"<a>").unwrap();
    session.detach().unwrap();
    drop(session);
    assert_eq!(out, b"<a>");
}

#[test]
fn chain_feeds_members_front_to_back() {
    // Escaping first: the note markup is added after escaping.
    let mut chain = DecoratorChain::new();
    chain
        .push_back(HtmlEscaper::new())
        .push_back(LineAnnotator::new(note_on_first_line()));
    let mut out = Vec::new();
    let mut session = chain.attach(&mut out);
    session.write_all(b"<\n").unwrap();
    session.detach().unwrap();
    drop(session);
    assert_eq!(out, b"&lt;<span class=\"note\">n</span>\n");

    // Annotating first: the escaper escapes the note markup too.
    let mut chain = DecoratorChain::new();
    chain
        .push_back(LineAnnotator::new(note_on_first_line()))
        .push_back(HtmlEscaper::new());
    let mut out = Vec::new();
    let mut session = chain.attach(&mut out);
    session.write_all(b"<\n").unwrap();
    session.detach().unwrap();
    drop(session);
    assert_eq!(out, b"&lt;&lt;span class=&quot;note&quot;&gt;n&lt;/span&gt;\n");
}

#[test]
fn chain_is_formatted_if_any_member_is() {
    let mut chain = DecoratorChain::new();
    chain.push_back(LineAnnotator::new(Notes::new()));
    assert!(!chain.is_formatted());
    chain.push_back(HtmlEscaper::new());
    assert!(chain.is_formatted());
    assert_eq!(chain.len(), 2);
}

#[test]
fn chain_finishes_front_to_back() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut chain = DecoratorChain::new();
    chain
        .push_back(Recorder::new("outer", &calls))
        .push_back(Recorder::new("inner", &calls));
    let mut out = Vec::new();
    let mut session = chain.attach(&mut out);
    session.write_all(b"x").unwrap();
    session.flush().unwrap();
    session.detach().unwrap();
    drop(session);

    // The outer member's closing output still passes through the inner one.
    assert_eq!(out, b"x[outer][inner]");
    assert_eq!(
        *calls.borrow(),
        [
            "outer.write",
            "inner.write",
            "outer.sync",
            "inner.sync",
            "outer.finish",
            "inner.write",
            "inner.finish",
        ]
    );
}

#[test]
fn boxed_decorators_attach() {
    let mut boxed: Box<dyn Decorator> = Box::new(HtmlEscaper::new());
    let mut out = Vec::new();
    let mut session = boxed.attach(&mut out);
    session.write_all(b"&").unwrap();
    drop(session);
    assert_eq!(out, b"&amp;");
}

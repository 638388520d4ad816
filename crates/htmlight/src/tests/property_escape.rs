use bstr::ByteSlice;
use quickcheck::QuickCheck;

use super::quickcheck_tests;
use crate::decorators::HtmlEscaper;
use crate::{Decorator, render_text};

fn escape(input: &[u8]) -> Vec<u8> {
    let mut escaper = HtmlEscaper::new();
    let mut out = Vec::new();
    let mut session = escaper.attach(&mut out);
    std::io::Write::write_all(&mut session, input).unwrap();
    session.detach().unwrap();
    drop(session);
    out
}

fn unescape(html: &[u8]) -> Vec<u8> {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Property: unescaping the output gives back the input, and the output
/// holds no markup characters other than the entities themselves.
#[test]
fn escape_round_trip() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(input: Vec<u8>) -> bool {
        let input: Vec<u8> = input.into_iter().filter(|&b| b != 0).collect();
        let html = escape(&input);
        let bare = unescape(&html);
        bare == input
            && !html.contains(&b'<')
            && !html.contains(&b'>')
            && !html.contains(&b'"')
            && html.find_iter("&").count() == input.find_iter("&").count()
                + input.find_iter("<").count()
                + input.find_iter(">").count()
                + input.find_iter("\"").count()
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn escaping_twice_escapes_the_ampersands() {
    assert_eq!(escape(b"a<b"), b"a&lt;b");
    assert_eq!(escape(&escape(b"a<b")), b"a&amp;lt;b");
}

#[test]
fn formatted_text_is_preformatted() {
    let mut out = Vec::new();
    render_text(b"x&y", &mut HtmlEscaper::new(), &mut out).unwrap();
    assert_eq!(out.as_bstr(), "<pre class=\"code\">\nx&amp;y</pre>\n".as_bytes().as_bstr());
}

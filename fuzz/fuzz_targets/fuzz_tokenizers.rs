#![no_main]

use arbitrary::Arbitrary;
use htmlight::Tokenizer;
use htmlight::chunk_utils::split_at_points;
use htmlight::scanner::{
    CalendarTokenizer, CppTokenizer, HrefTokenizer, MailTokenizer, MarkupTokenizer,
    ShellTokenizer, TokenLog, XmlEscTokenizer, XmlTokenizer,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Family {
    XmlEscape,
    Cpp,
    Shell,
    Mail,
    Calendar,
    Href,
    Xml,
    Markup,
}

#[derive(Debug, Arbitrary)]
struct Input {
    family: Family,
    payload: Vec<u8>,
    splits: Vec<usize>,
}

fn scan<T: Tokenizer + Default>(chunks: &[&[u8]]) -> TokenLog<T::Kind> {
    let mut tokenizer = T::default();
    let mut log = TokenLog::default();
    for chunk in chunks {
        tokenizer.tokenize(chunk, &mut log);
    }
    tokenizer.finish(&mut log);
    log
}

/// Every byte is delivered exactly once, and chunking only moves fragment
/// boundaries.
fn check<T: Tokenizer + Default>(payload: &[u8], splits: &[usize]) {
    let whole = scan::<T>(&[payload]);
    let split = scan::<T>(&split_at_points(payload, splits));
    assert_eq!(whole.text(), payload);
    assert_eq!(split.text(), payload);

    let merged = |log: &TokenLog<T::Kind>| {
        let mut runs: Vec<(Option<T::Kind>, Vec<u8>)> = Vec::new();
        for event in log.coalesced() {
            let (kind, text) = match event {
                htmlight::scanner::Event::Token { kind, text, .. } => (Some(kind), text),
                htmlight::scanner::Event::Newline(text) => (None, text),
            };
            match runs.last_mut() {
                Some((last, bytes)) if kind.is_some() && *last == kind => bytes.extend_from_slice(&text),
                _ => runs.push((kind, text)),
            }
        }
        runs
    };
    assert_eq!(merged(&whole), merged(&split));
}

fuzz_target!(|input: Input| {
    // NUL ends a stream; keep the payload a single stream.
    let payload: Vec<u8> = input.payload.into_iter().filter(|&b| b != 0).collect();
    let splits = &input.splits;
    match input.family {
        Family::XmlEscape => check::<XmlEscTokenizer>(&payload, splits),
        Family::Cpp => check::<CppTokenizer>(&payload, splits),
        Family::Shell => check::<ShellTokenizer>(&payload, splits),
        Family::Mail => check::<MailTokenizer>(&payload, splits),
        Family::Calendar => check::<CalendarTokenizer>(&payload, splits),
        Family::Href => check::<HrefTokenizer>(&payload, splits),
        Family::Xml => check::<XmlTokenizer>(&payload, splits),
        Family::Markup => check::<MarkupTokenizer>(&payload, splits),
    }
});

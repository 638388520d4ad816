use quickcheck::QuickCheck;

use super::{arbitrary::Snippet, quickcheck_tests};
use crate::Tokenizer;
use crate::chunk_utils::split_at_points;
use crate::scanner::{
    CalendarTokenizer, CppTokenizer, HrefTokenizer, MailTokenizer, MarkupTokenizer,
    ShellTokenizer, TokenLog, XmlEscTokenizer, XmlTokenizer,
};

fn scan<T: Tokenizer + Default>(chunks: &[&[u8]]) -> TokenLog<T::Kind> {
    let mut tokenizer = T::default();
    let mut log = TokenLog::default();
    for chunk in chunks {
        tokenizer.tokenize(chunk, &mut log);
    }
    tokenizer.finish(&mut log);
    log
}

/// Property: splitting the input into arbitrary chunks changes neither the
/// bytes delivered nor, once fragments are joined, the token stream.
fn check_partition<T: Tokenizer + Default>() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop<T: Tokenizer + Default>(snippet: Snippet, splits: Vec<usize>) -> bool {
        let input = snippet.0.as_slice();
        let whole = scan::<T>(&[input]);
        let split = scan::<T>(&split_at_points(input, &splits));
        whole.text() == input && split.text() == input && whole.coalesced() == split.coalesced()
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop::<T> as fn(Snippet, Vec<usize>) -> bool);
}

#[test]
fn partition_xml_escape() {
    check_partition::<XmlEscTokenizer>();
}

#[test]
fn partition_cpp() {
    check_partition::<CppTokenizer>();
}

#[test]
fn partition_shell() {
    check_partition::<ShellTokenizer>();
}

#[test]
fn partition_mail() {
    check_partition::<MailTokenizer>();
}

#[test]
fn partition_calendar() {
    check_partition::<CalendarTokenizer>();
}

#[test]
fn partition_href() {
    check_partition::<HrefTokenizer>();
}

#[test]
fn partition_xml() {
    check_partition::<XmlTokenizer>();
}

#[test]
fn partition_markup() {
    check_partition::<MarkupTokenizer>();
}

#[test]
fn partition_byte_by_byte() {
    let input = b"#define X \\\n  \"a\\\"b\" /* c\n d */ int y = 0x1F;\n";
    let bytes: Vec<&[u8]> = input.chunks(1).collect();
    assert_eq!(
        scan::<CppTokenizer>(&bytes).coalesced(),
        scan::<CppTokenizer>(&[input]).coalesced()
    );
}

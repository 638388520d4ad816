use super::*;

fn scan<T: Tokenizer + Default>(chunks: &[&[u8]]) -> TokenLog<T::Kind> {
    let mut tokenizer = T::default();
    let mut log = TokenLog::default();
    for chunk in chunks {
        tokenizer.tokenize(chunk, &mut log);
    }
    tokenizer.finish(&mut log);
    log
}

fn tokens<T: Tokenizer + Default>(input: &str) -> Vec<(T::Kind, String)> {
    scan::<T>(&[input.as_bytes()]).tokens()
}

fn pairs<K: Copy>(expected: &[(K, &str)]) -> Vec<(K, String)> {
    expected
        .iter()
        .map(|&(kind, text)| (kind, text.to_string()))
        .collect()
}

fn token(kind: XmlEscKind, text: &str, fragment: bool) -> Event<XmlEscKind> {
    Event::Token {
        kind,
        text: text.as_bytes().to_vec(),
        fragment,
    }
}

mod xml_esc {
    use super::*;
    use XmlEscKind::*;

    #[test]
    fn splits_out_escapes() {
        assert_eq!(
            tokens::<XmlEscTokenizer>("a<b & \"c\">"),
            pairs(&[
                (Data, "a"),
                (LtEscape, "<"),
                (Data, "b "),
                (AmpEscape, "&"),
                (Data, " "),
                (QuotEscape, "\""),
                (Data, "c"),
                (QuotEscape, "\""),
                (GtEscape, ">"),
            ])
        );
    }

    #[test]
    fn data_is_fragmented_at_chunk_end() {
        let log = scan::<XmlEscTokenizer>(&[b"ab", b"cd<"]);
        assert_eq!(
            log.events(),
            &[
                token(Data, "ab", true),
                token(Data, "cd", false),
                token(LtEscape, "<", false),
            ]
        );
    }

    #[test]
    fn nul_ends_the_stream() {
        let mut tokenizer = XmlEscTokenizer::default();
        let mut log = TokenLog::default();
        assert_eq!(tokenizer.tokenize(b"ab\0cd", &mut log), 2);
        assert_eq!(log.events(), &[token(Data, "ab", false)]);
        assert!(tokenizer.retained().is_empty());
    }

    #[test]
    fn backslash_continues_the_line() {
        let log = scan::<XmlEscTokenizer>(&[b"a\\\nb"]);
        assert_eq!(
            log.coalesced(),
            vec![
                token(Data, "a", false),
                Event::Newline(b"\\\n".to_vec()),
                token(Data, "b", false),
            ]
        );
    }

    #[test]
    fn carriage_return_is_retained_at_chunk_end() {
        let mut tokenizer = XmlEscTokenizer::default();
        let mut log = TokenLog::default();
        tokenizer.tokenize(b"a\r", &mut log);
        assert_eq!(tokenizer.retained(), b"\r");
        tokenizer.tokenize(b"\nb", &mut log);
        tokenizer.finish(&mut log);
        assert_eq!(
            log.coalesced(),
            vec![
                token(Data, "a", false),
                Event::Newline(b"\r\n".to_vec()),
                token(Data, "b", false),
            ]
        );
    }
}

mod cpp {
    use super::*;
    use CppKind::*;

    #[test]
    fn keywords_are_sorted() {
        assert!(crate::scanner::cpp::KEYWORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn declaration_with_comment() {
        assert_eq!(
            tokens::<CppTokenizer>("int x = 42; // hi\n"),
            pairs(&[
                (Keyword, "int"),
                (Space, " "),
                (Identifier, "x"),
                (Space, " "),
                (Punctuation, "="),
                (Space, " "),
                (Number, "42"),
                (Punctuation, ";"),
                (Space, " "),
                (LineComment, "// hi"),
            ])
        );
    }

    #[test]
    fn directive_at_line_start() {
        assert_eq!(
            tokens::<CppTokenizer>("#include <stdio.h>\n"),
            pairs(&[
                (Preprocessing, "#include"),
                (Space, " "),
                (Punctuation, "<"),
                (Identifier, "stdio"),
                (Punctuation, "."),
                (Identifier, "h"),
                (Punctuation, ">"),
            ])
        );
    }

    #[test]
    fn continued_line_is_not_a_line_start() {
        assert_eq!(
            tokens::<CppTokenizer>("a \\\n#b"),
            pairs(&[
                (Identifier, "a"),
                (Space, " "),
                (Punctuation, "#"),
                (Identifier, "b"),
            ])
        );
    }

    #[test]
    fn block_comment_spans_lines() {
        let log = scan::<CppTokenizer>(&[b"/* a\nb */x"]);
        assert_eq!(
            log.coalesced(),
            vec![
                Event::Token {
                    kind: Comment,
                    text: b"/* a".to_vec(),
                    fragment: false
                },
                Event::Newline(b"\n".to_vec()),
                Event::Token {
                    kind: Comment,
                    text: b"b */".to_vec(),
                    fragment: false
                },
                Event::Token {
                    kind: Identifier,
                    text: b"x".to_vec(),
                    fragment: false
                },
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            tokens::<CppTokenizer>("'a' 1.5e+3f \"s\\\"t\""),
            pairs(&[
                (CharLiteral, "'a'"),
                (Space, " "),
                (Number, "1.5e+3f"),
                (Space, " "),
                (StringLiteral, "\"s\\\"t\""),
            ])
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert_eq!(
            tokens::<CppTokenizer>("\"abc\nx"),
            pairs(&[(Error, "\"abc"), (Identifier, "x")])
        );
    }

    #[test]
    fn identifiers_are_never_fragmented() {
        let log = scan::<CppTokenizer>(&[b"ret", b"urn 0;"]);
        assert_eq!(
            log.events()[0],
            Event::Token {
                kind: Keyword,
                text: b"return".to_vec(),
                fragment: false
            }
        );
    }

    #[test]
    fn comments_are_fragmented() {
        let log = scan::<CppTokenizer>(&[b"/* ab", b"c */"]);
        assert_eq!(
            log.events(),
            &[
                Event::Token {
                    kind: Comment,
                    text: b"/* ab".to_vec(),
                    fragment: true
                },
                Event::Token {
                    kind: Comment,
                    text: b"c */".to_vec(),
                    fragment: false
                },
            ]
        );
    }
}

mod shell {
    use super::*;
    use ShellKind::*;

    #[test]
    fn script_with_shebang() {
        assert_eq!(
            tokens::<ShellTokenizer>("#!/bin/sh\necho $HOME \"hi $x\" # c\n"),
            pairs(&[
                (Shebang, "#!/bin/sh"),
                (Code, "echo "),
                (Variable, "$HOME"),
                (Code, " "),
                (StringLiteral, "\"hi $x\""),
                (Code, " "),
                (Comment, "# c"),
            ])
        );
    }

    #[test]
    fn hash_inside_a_word_is_code() {
        assert_eq!(
            tokens::<ShellTokenizer>("echo a#b\n"),
            pairs(&[(Code, "echo a#b")])
        );
    }

    #[test]
    fn variable_forms() {
        assert_eq!(
            tokens::<ShellTokenizer>("x=${foo}bar $? $(ls)\n"),
            pairs(&[
                (Code, "x="),
                (Variable, "${foo}"),
                (Code, "bar "),
                (Variable, "$?"),
                (Code, " $(ls)"),
            ])
        );
    }

    #[test]
    fn strings_span_lines() {
        assert_eq!(
            tokens::<ShellTokenizer>("'a\nb'"),
            pairs(&[(StringLiteral, "'a"), (StringLiteral, "b'")])
        );
    }
}

mod mail {
    use super::*;
    use MailKind::*;

    #[test]
    fn subject_field() {
        assert_eq!(
            tokens::<MailTokenizer>("Subject: Hello\n"),
            pairs(&[
                (FieldName, "Subject"),
                (FieldSeparator, ": "),
                (FieldBody, "Hello"),
            ])
        );
    }

    #[test]
    fn folding_and_body() {
        let log = scan::<MailTokenizer>(&[b"To: a,\n b\n\nHi there\n"]);
        let newlines = log
            .events()
            .iter()
            .filter(|e| matches!(e, Event::Newline(_)))
            .count();
        assert_eq!(newlines, 4);
        assert_eq!(
            log.tokens(),
            pairs(&[
                (FieldName, "To"),
                (FieldSeparator, ": "),
                (FieldBody, "a,"),
                (FieldBody, " b"),
                (MessageBody, "Hi there"),
            ])
        );
    }

    #[test]
    fn line_without_colon_is_an_error() {
        assert_eq!(
            tokens::<MailTokenizer>("garbage line\nX: y\n"),
            pairs(&[
                (Error, "garbage line"),
                (FieldName, "X"),
                (FieldSeparator, ": "),
                (FieldBody, "y"),
            ])
        );
    }
}

mod calendar {
    use super::*;
    use CalendarKind::*;

    #[test]
    fn content_lines() {
        assert_eq!(
            tokens::<CalendarTokenizer>(
                "BEGIN:VEVENT\r\nDTSTART;TZID=\"a:b\":20240101T090000\r\n folded\r\n"
            ),
            pairs(&[
                (PropertyName, "BEGIN"),
                (ValueSeparator, ":"),
                (Value, "VEVENT"),
                (PropertyName, "DTSTART"),
                (Parameters, ";TZID=\"a:b\""),
                (ValueSeparator, ":"),
                (Value, "20240101T090000"),
                (Value, " folded"),
            ])
        );
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(
            tokens::<CalendarTokenizer>("bad line\nX;broken\n"),
            pairs(&[
                (Error, "bad line"),
                (PropertyName, "X"),
                (Error, ";broken"),
            ])
        );
    }
}

mod href {
    use super::*;
    use HrefKind::*;

    #[test]
    fn urls_and_paths() {
        assert_eq!(
            tokens::<HrefTokenizer>("see https://example.com/x. and ./docs/a.html\n"),
            pairs(&[
                (Text, "see "),
                (Url, "https://example.com/x"),
                (Text, ". and "),
                (Path, "./docs/a.html"),
            ])
        );
    }

    #[test]
    fn links_only_start_words() {
        assert_eq!(
            tokens::<HrefTokenizer>("foo/bar x/y"),
            pairs(&[(Text, "foo/bar x/y")])
        );
    }
}

mod xml {
    use super::*;
    use XmlKind::*;

    #[test]
    fn anchor_element() {
        assert_eq!(
            tokens::<XmlTokenizer>("<a href=\"x.html\">hi</a>"),
            pairs(&[
                (TagOpen, "<"),
                (ElementName, "a"),
                (Space, " "),
                (AttrName, "href"),
                (Equals, "="),
                (AttrValue, "\"x.html\""),
                (TagClose, ">"),
                (Data, "hi"),
                (EndTagOpen, "</"),
                (ElementName, "a"),
                (TagClose, ">"),
            ])
        );
    }

    #[test]
    fn comment_and_empty_element() {
        assert_eq!(
            tokens::<XmlTokenizer>("<!-- c -->x<br/>"),
            pairs(&[
                (Comment, "<!-- c -->"),
                (Data, "x"),
                (TagOpen, "<"),
                (ElementName, "br"),
                (EmptyTagClose, "/>"),
            ])
        );
    }

    #[test]
    fn bare_attribute_value() {
        assert_eq!(
            tokens::<XmlTokenizer>("<p class=x>"),
            pairs(&[
                (TagOpen, "<"),
                (ElementName, "p"),
                (Space, " "),
                (AttrName, "class"),
                (Equals, "="),
                (AttrValue, "x"),
                (TagClose, ">"),
            ])
        );
    }

    #[test]
    fn stray_angle_bracket() {
        assert_eq!(
            tokens::<XmlTokenizer>("a < b"),
            pairs(&[(Data, "a "), (Error, "<"), (Data, " b")])
        );
    }
}

mod markup {
    use super::*;

    fn named(input: &str) -> Vec<(String, String)> {
        tokens::<MarkupTokenizer>(input)
            .into_iter()
            .map(|(kind, text)| (kind.to_string(), text))
            .collect()
    }

    fn expected(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|&(kind, text)| (kind.to_string(), text.to_string()))
            .collect()
    }

    #[test]
    fn elements_are_sorted() {
        assert!(MARKUP_ELEMENTS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn start_kinds_are_even() {
        let start = MarkupKind::start_of(b"para").unwrap();
        let end = MarkupKind::end_of(b"para").unwrap();
        assert_eq!(start.0 % 2, 0);
        assert_eq!(end.0 % 2, 1);
        assert_eq!(start.0, end.0 + 1);
        assert!(start.is_start() && end.is_end());
        assert_eq!(start.element(), Some("para"));
        assert!(!MarkupKind::TEXT.is_element());
        assert_eq!(MarkupKind::start_of(b"bogus"), None);
    }

    #[test]
    fn nested_elements() {
        assert_eq!(
            named("<para>Hi <emphasis role=\"x\">there</emphasis></para>"),
            expected(&[
                ("paraStart", "<para>"),
                ("text", "Hi "),
                ("emphasisStart", "<emphasis role=\"x\">"),
                ("text", "there"),
                ("emphasisEnd", "</emphasis>"),
                ("paraEnd", "</para>"),
            ])
        );
    }

    #[test]
    fn self_closing_element() {
        assert_eq!(
            named("<xref linkend=\"a/b\"/>"),
            expected(&[("xrefStart", "<xref linkend=\"a/b\""), ("xrefEnd", "/>")])
        );
    }

    #[rstest::rstest]
    #[case::unknown_empty_element("<x/>", &[("error", "<x/>")])]
    #[case::nameless_end_tag("<//>", &[("error", "<//>")])]
    #[case::end_tag_with_slash("</para/>", &[("paraEnd", "</para/>")])]
    #[case::known_empty_element("<xref/>", &[("xrefStart", "<xref"), ("xrefEnd", "/>")])]
    #[case::stray_tag_inside_an_end_tag("</<title/>", &[("error", "</<title/>")])]
    fn slash_close_is_split_independent(#[case] input: &str, #[case] whole: &[(&str, &str)]) {
        assert_eq!(named(input), expected(whole));
        let bytes = input.as_bytes();
        for at in 1..bytes.len() {
            let split = scan::<MarkupTokenizer>(&[&bytes[..at], &bytes[at..]]);
            assert_eq!(
                split.coalesced(),
                scan::<MarkupTokenizer>(&[bytes]).coalesced(),
                "split at {at}"
            );
        }
    }

    #[test]
    fn unknown_element_is_an_error() {
        assert_eq!(
            named("<bogus>x<!-- c -->"),
            expected(&[("error", "<bogus>"), ("text", "x"), ("comment", "<!-- c -->")])
        );
    }
}

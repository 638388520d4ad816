/// Classification of the bytes at the scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineEnd {
    /// Not a line terminator.
    None,
    /// Could be a terminator but the buffer ends before it can be decided.
    Incomplete,
    Terminator { len: usize, escaped: bool },
}

/// Recognise a line terminator at the start of `rest`.
///
/// `\r\n` counts as one terminator, a lone `\r` as another. When
/// `continuation` is set, a backslash immediately followed by a terminator
/// forms an escaped terminator that includes the backslash. At end of input
/// (`eof`) nothing is left undecided.
pub(crate) fn line_end(rest: &[u8], continuation: bool, eof: bool) -> LineEnd {
    match rest {
        [b'\n', ..] => LineEnd::Terminator {
            len: 1,
            escaped: false,
        },
        [b'\r', tail @ ..] => terminator_after_cr(tail, 1, false, eof),
        [b'\\', tail @ ..] if continuation => match tail {
            [b'\n', ..] => LineEnd::Terminator {
                len: 2,
                escaped: true,
            },
            [b'\r', tail @ ..] => terminator_after_cr(tail, 2, true, eof),
            [] if !eof => LineEnd::Incomplete,
            _ => LineEnd::None,
        },
        _ => LineEnd::None,
    }
}

fn terminator_after_cr(tail: &[u8], len: usize, escaped: bool, eof: bool) -> LineEnd {
    match tail {
        [b'\n', ..] => LineEnd::Terminator {
            len: len + 1,
            escaped,
        },
        [] if !eof => LineEnd::Incomplete,
        _ => LineEnd::Terminator { len, escaped },
    }
}

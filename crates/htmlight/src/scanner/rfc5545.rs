use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Cursor, Engine, Lexer, Step, TokenKind, TokenListener, engine::prefix_len};

/// Tokens of an iCalendar content line: `NAME;PARAM=x:VALUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CalendarKind {
    Error,
    PropertyName,
    /// Everything from the first `;` up to the value separator.
    Parameters,
    ValueSeparator,
    Value,
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::PropertyName => "propertyName",
            Self::Parameters => "parameters",
            Self::ValueSeparator => "valueSeparator",
            Self::Value => "value",
        })
    }
}

impl TokenKind for CalendarKind {
    const ERROR: Self = Self::Error;

    fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Error => Some("icalError"),
            Self::PropertyName => Some("icalName"),
            Self::Parameters => Some("icalParams"),
            Self::Value => Some("icalValue"),
            Self::ValueSeparator => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    LineStart,
    /// The line was consumed up to its end.
    Done,
    Value,
}

#[derive(Debug, Default)]
pub struct CalendarLexer {
    state: State,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn is_eol(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// Length of the parameter list at the start of `rest` (which begins with
/// `;`) and whether it ends at the value separator. Colons inside double
/// quotes do not count. `None` when the buffer ends first.
fn parameters_len(rest: &[u8], eof: bool) -> Option<(usize, bool)> {
    let mut quoted = false;
    for (i, &b) in rest.iter().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b':' if !quoted => return Some((i, true)),
            _ if is_eol(b) => return Some((i, false)),
            _ => {}
        }
    }
    eof.then_some((rest.len(), false))
}

impl CalendarLexer {
    fn content_line<L: TokenListener<CalendarKind> + ?Sized>(
        &mut self,
        cur: &mut Cursor<'_, CalendarKind, L>,
    ) -> Step {
        let rest = cur.rest();
        let eof = cur.is_eof();
        let name = prefix_len(rest, is_name_byte);
        if name == rest.len() && !eof {
            return Step::Incomplete;
        }

        match rest.get(name) {
            Some(b':') if name > 0 => {
                cur.bump_n(name);
                cur.emit(CalendarKind::PropertyName);
                cur.bump();
                cur.emit(CalendarKind::ValueSeparator);
                self.state = State::Value;
            }
            Some(b';') if name > 0 => {
                let Some((params, separated)) = parameters_len(&rest[name..], eof) else {
                    return Step::Incomplete;
                };
                cur.bump_n(name);
                cur.emit(CalendarKind::PropertyName);
                cur.bump_n(params);
                if separated {
                    cur.emit(CalendarKind::Parameters);
                    cur.bump();
                    cur.emit(CalendarKind::ValueSeparator);
                    self.state = State::Value;
                } else {
                    cur.emit(CalendarKind::Error);
                    self.state = State::Done;
                }
            }
            _ => {
                match rest.iter().position(|&b| is_eol(b)) {
                    Some(len) => cur.bump_n(len),
                    None if eof => cur.bump_n(rest.len()),
                    None => return Step::Incomplete,
                }
                cur.emit(CalendarKind::Error);
                self.state = State::Done;
            }
        }
        Step::Continue
    }
}

impl Lexer for CalendarLexer {
    type Kind = CalendarKind;

    const LINE_CONTINUATION: bool = false;

    fn in_flight(&self) -> Option<CalendarKind> {
        match self.state {
            State::LineStart => None,
            State::Done => Some(CalendarKind::Error),
            State::Value => Some(CalendarKind::Value),
        }
    }

    fn step<L: TokenListener<CalendarKind> + ?Sized>(
        &mut self,
        cur: &mut Cursor<'_, CalendarKind, L>,
    ) -> Step {
        let Some(b) = cur.peek() else {
            return Step::Incomplete;
        };
        match self.state {
            // Folded line: a leading blank continues the previous value.
            State::LineStart if b == b' ' || b == b'\t' => {
                self.state = State::Value;
                cur.bump_run(|_| false);
                Step::Continue
            }
            State::LineStart => self.content_line(cur),
            State::Done | State::Value => {
                cur.bump_run(|_| false);
                Step::Continue
            }
        }
    }

    fn line_end(&mut self, _escaped: bool) {
        self.state = State::LineStart;
    }
}

/// Tokenizer for RFC 5545 calendar data.
pub type CalendarTokenizer = Engine<CalendarLexer>;

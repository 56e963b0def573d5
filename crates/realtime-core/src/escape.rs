//! Time escape codes in displayable text.
//!
//! Dialogue can embed codes such as `\Hour12:\Minute \Meridiem`; the
//! expander replaces each with a value read from the clock variables at
//! the moment of expansion, so the same template yields different text
//! as time moves on.
//!
//! Several codes share a prefix (`\Hour` vs `\Hour24`, `\Year` vs
//! `\YearA`, `\Month` vs `\MonthID`). The tokenizer tries the codes in a
//! fixed order with the longer, more specific spelling first, consumes
//! the matched span, and never rescans text it has already emitted.
//! Matching is ASCII case-insensitive. A prefix character that does not
//! start a known code is kept as-is.

use std::sync::Arc;

use realtime_types::{Meridiem, VariableId};

use crate::config::VariableBindings;
use crate::host::{VariableStore, read_variable};
use crate::vocabulary::Vocabulary;

/// A recognised time escape code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeToken {
    /// `YearA`: last two digits of the year, not padded.
    YearShort,
    /// `Year`: full year.
    Year,
    /// `MonthID`: month number 1-12.
    MonthId,
    /// `Month`: localized month name.
    Month,
    /// `Date`: day of month.
    Date,
    /// `WeekDay`: localized weekday name.
    WeekDay,
    /// `Hour24`: hour 0-23.
    Hour24,
    /// `Hour12`: hour modulo 12, so midnight and noon show 0.
    Hour12,
    /// `Hour`: alias of `Hour24`.
    Hour,
    /// `Minute`: minute padded to two digits.
    Minute,
    /// `Second`: second padded to two digits.
    Second,
    /// `Meridiem`: localized AM/PM label.
    Meridiem,
}

/// Codes in match priority order. A code must come before any shorter
/// code that is a prefix of it.
const TOKENS: [(&str, TimeToken); 12] = [
    ("YearA", TimeToken::YearShort),
    ("Year", TimeToken::Year),
    ("MonthID", TimeToken::MonthId),
    ("Month", TimeToken::Month),
    ("Date", TimeToken::Date),
    ("WeekDay", TimeToken::WeekDay),
    ("Hour24", TimeToken::Hour24),
    ("Hour12", TimeToken::Hour12),
    ("Hour", TimeToken::Hour),
    ("Minute", TimeToken::Minute),
    ("Second", TimeToken::Second),
    ("Meridiem", TimeToken::Meridiem),
];

/// A piece of tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged.
    Literal(&'a str),
    /// A time escape code.
    Token(TimeToken),
}

/// Match a code at the start of `rest` (the text right after a prefix).
fn match_token(rest: &str) -> Option<(TimeToken, usize)> {
    TOKENS.iter().find_map(|&(name, token)| {
        rest.get(..name.len())
            .filter(|head| head.eq_ignore_ascii_case(name))
            .map(|_| (token, name.len()))
    })
}

/// Split `text` into literals and time codes introduced by `prefix`.
pub fn tokenize(text: &str, prefix: char) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start: usize = 0;
    let mut cursor: usize = 0;

    while let Some(offset) = text.get(cursor..).and_then(|rest| rest.find(prefix)) {
        let at = cursor.saturating_add(offset);
        let after = at.saturating_add(prefix.len_utf8());

        match text.get(after..).and_then(match_token) {
            Some((token, len)) => {
                if let Some(literal) = text.get(literal_start..at).filter(|s| !s.is_empty()) {
                    segments.push(Segment::Literal(literal));
                }
                segments.push(Segment::Token(token));
                cursor = after.saturating_add(len);
                literal_start = cursor;
            }
            None => cursor = after,
        }
    }

    if let Some(literal) = text.get(literal_start..).filter(|s| !s.is_empty()) {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Clock values as read from the variables for one expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeFields {
    /// Full year.
    pub year: i64,
    /// Month, 1-12.
    pub month: i64,
    /// Day of month.
    pub date: i64,
    /// Weekday, 1 = Monday.
    pub week_day: i64,
    /// Hour, 0-23.
    pub hour: i64,
    /// Minute.
    pub minute: i64,
    /// Second.
    pub second: i64,
}

impl TimeFields {
    /// Read every bound field; unbound fields read as 0.
    pub fn read(store: &dyn VariableStore, bindings: &VariableBindings) -> Self {
        let get = |id: VariableId| read_variable(store, id);
        Self {
            year: get(bindings.year),
            month: get(bindings.month),
            date: get(bindings.date),
            week_day: get(bindings.week_day),
            hour: get(bindings.hour),
            minute: get(bindings.minute),
            second: get(bindings.second),
        }
    }
}

/// Render one code.
pub fn render_token(token: TimeToken, fields: &TimeFields, vocabulary: &Vocabulary) -> String {
    match token {
        TimeToken::YearShort => fields.year.checked_rem(100).unwrap_or(0).to_string(),
        TimeToken::Year => fields.year.to_string(),
        TimeToken::MonthId => fields.month.clamp(1, 12).to_string(),
        TimeToken::Month => vocabulary.month_name(fields.month).to_owned(),
        TimeToken::Date => fields.date.to_string(),
        TimeToken::WeekDay => vocabulary.week_day_name(fields.week_day).to_owned(),
        TimeToken::Hour24 | TimeToken::Hour => fields.hour.to_string(),
        TimeToken::Hour12 => fields.hour.checked_rem(12).unwrap_or(0).to_string(),
        TimeToken::Minute => format!("{:02}", fields.minute),
        TimeToken::Second => format!("{:02}", fields.second),
        TimeToken::Meridiem => vocabulary
            .meridiem(Meridiem::from_hour(fields.hour))
            .to_owned(),
    }
}

/// Expands time escape codes using the live clock variables.
pub struct EscapeCodeExpander {
    variables: Arc<dyn VariableStore>,
    bindings: VariableBindings,
    vocabulary: Vocabulary,
    prefix: char,
}

impl EscapeCodeExpander {
    /// Create an expander reading `bindings` from `variables`.
    pub fn new(
        variables: Arc<dyn VariableStore>,
        bindings: VariableBindings,
        vocabulary: Vocabulary,
        prefix: char,
    ) -> Self {
        Self {
            variables,
            bindings,
            vocabulary,
            prefix,
        }
    }

    /// Replace every time code in `text`.
    ///
    /// Reads the variables once per call and writes nothing. Text without
    /// codes is returned unchanged.
    pub fn expand(&self, text: &str) -> String {
        let segments = tokenize(text, self.prefix);
        if !segments.iter().any(|s| matches!(s, Segment::Token(_))) {
            return text.to_owned();
        }

        let fields = TimeFields::read(self.variables.as_ref(), &self.bindings);
        let mut out = String::with_capacity(text.len());
        for segment in segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Token(token) => {
                    out.push_str(&render_token(token, &fields, &self.vocabulary));
                }
            }
        }
        out
    }

    /// The character that introduces a code.
    pub const fn prefix(&self) -> char {
        self.prefix
    }
}

impl core::fmt::Debug for EscapeCodeExpander {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EscapeCodeExpander")
            .field("bindings", &self.bindings)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

//! Timestamp-prefixed line grammar
//!
//! Recognizes export lines of the shape
//! `D1/D2/YY[YY][,] HH:MM[ AM|PM] - remainder`, where the separators between
//! the date fields may be `/` or `-` and the separator before the remainder
//! may be a hyphen, figure dash, en dash, em dash or minus sign. Lines are
//! expected to have gone through [`crate::normalize_line`] first.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::DateOrder;
use crate::Message;

/// Character class for the dash between the time and the remainder.
pub(crate) const SEPARATOR_DASH: &str = r"[-\x{2012}\x{2013}\x{2014}\x{2212}]";

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*([0-9]{{1,2}})[/-]([0-9]{{1,2}})[/-]([0-9]{{2,4}}),?\s+([0-9]{{1,2}}):([0-9]{{2}})(?:\s*([AaPp][Mm]))?\s*{}\s*(.*)$",
        SEPARATOR_DASH
    ))
    .expect("line grammar regex is valid")
});

/// Separator between sender and message text.
const SENDER_DELIMITER: &str = ": ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// Raw fields of a line that matched the grammar, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub first: u32,
    pub second: u32,
    pub year: u32,
    /// Number of digits the year was written with.
    pub year_digits: usize,
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Option<Meridiem>,
    pub remainder: &'a str,
}

impl Candidate<'_> {
    /// Two-digit years are always taken to be in the 2000s.
    pub fn full_year(&self) -> u32 {
        if self.year_digits == 2 {
            self.year + 2000
        } else {
            self.year
        }
    }

    /// Hour on a 24-hour clock.
    pub fn hour_24(&self) -> u32 {
        match (self.meridiem, self.hour) {
            (Some(Meridiem::Am), 12) => 0,
            (Some(Meridiem::Pm), h @ 1..=11) => h + 12,
            (_, h) => h,
        }
    }
}

/// Match `line` against the grammar without interpreting the fields.
pub fn match_candidate(line: &str) -> Option<Candidate<'_>> {
    let caps = LINE_RE.captures(line)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year_match = caps.get(3)?;
    let meridiem = caps.get(6).map(|m| {
        if m.as_str().eq_ignore_ascii_case("am") {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    });

    Some(Candidate {
        first: number(1)?,
        second: number(2)?,
        year: year_match.as_str().parse().ok()?,
        year_digits: year_match.as_str().len(),
        hour: number(4)?,
        minute: number(5)?,
        meridiem,
        remainder: caps.get(7).map_or("", |m| m.as_str()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Month,
    Day,
    Hour,
    Minute,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Month => "month",
            Field::Day => "day",
            Field::Hour => "hour",
            Field::Minute => "minute",
        };
        f.write_str(name)
    }
}

/// Why a grammar match was not accepted as a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutOfRange { field: Field, value: u32 },
    /// Fields were individually in range but do not form a real date,
    /// e.g. 31 April or 29 February in a common year.
    Rollover,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::OutOfRange { field, value } => {
                write!(f, "{} {} out of range", field, value)
            }
            RejectReason::Rollover => f.write_str("date does not exist"),
        }
    }
}

/// Result of parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Ordinary content or a continuation line.
    NotATimestamp,
    /// Matched the grammar but failed validation.
    InvalidTimestamp(RejectReason),
    Parsed(Message),
}

fn check_range(field: Field, value: u32, min: u32, max: u32) -> Result<(), RejectReason> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RejectReason::OutOfRange { field, value })
    }
}

fn validate(
    candidate: &Candidate<'_>,
    order: DateOrder,
) -> Result<NaiveDateTime, RejectReason> {
    let (month, day) = order.month_day(candidate.first, candidate.second);
    let hour = candidate.hour_24();

    check_range(Field::Month, month, 1, 12)?;
    check_range(Field::Day, day, 1, 31)?;
    check_range(Field::Hour, hour, 0, 23)?;
    check_range(Field::Minute, candidate.minute, 0, 59)?;

    // chrono refuses to roll over, so a `Some` here reads back exactly the
    // fields it was built from.
    let year = i32::try_from(candidate.full_year()).map_err(|_| RejectReason::Rollover)?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, candidate.minute, 0))
        .ok_or(RejectReason::Rollover)
}

fn split_sender(remainder: &str) -> (Option<String>, String) {
    match remainder.split_once(SENDER_DELIMITER) {
        Some((sender, text)) => (Some(sender.to_string()), text.to_string()),
        None => (None, remainder.to_string()),
    }
}

/// Parse one normalized line using the run's resolved date order.
pub fn parse_line(line: &str, order: DateOrder) -> LineOutcome {
    let Some(candidate) = match_candidate(line) else {
        return LineOutcome::NotATimestamp;
    };

    match validate(&candidate, order) {
        Ok(timestamp) => {
            let (sender, text) = split_sender(candidate.remainder);
            LineOutcome::Parsed(Message {
                timestamp,
                sender,
                text,
            })
        }
        Err(reason) => LineOutcome::InvalidTimestamp(reason),
    }
}

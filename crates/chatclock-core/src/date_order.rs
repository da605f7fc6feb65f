//! Day/month order detection
//!
//! The order is a property of the whole export, never of a single line:
//! every timestamp line votes once and the result is applied uniformly.
//! Ties are broken by looking for a 12-hour clock marker anywhere in the
//! export, including inside message text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::DateOrder;
use crate::parser::{match_candidate, SEPARATOR_DASH};

/// A time followed by AM/PM and then a separator dash, e.g. `5 PM -`.
static MERIDIEM_BEFORE_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"[0-9]\s*[AaPp][Mm]\s*{}", SEPARATOR_DASH))
        .expect("meridiem regex is valid")
});

/// Vote tally over all timestamp-shaped lines of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateOrderVotes {
    pub mdy: usize,
    pub dmy: usize,
    /// Whether any line had an AM/PM marker right before a separator dash.
    pub saw_meridiem: bool,
}

impl DateOrderVotes {
    pub fn tally<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut votes = Self::default();

        for line in lines {
            let line = line.as_ref();
            if !votes.saw_meridiem && MERIDIEM_BEFORE_SEPARATOR_RE.is_match(line) {
                votes.saw_meridiem = true;
            }

            let Some(candidate) = match_candidate(line) else {
                continue;
            };
            let (a, b) = (candidate.first, candidate.second);
            if b > 12 && a <= 12 {
                votes.mdy += 1;
            } else if a > 12 && b <= 12 {
                votes.dmy += 1;
            }
        }

        votes
    }

    /// Majority wins; a tie falls back to MDY when 12-hour clocks were seen.
    pub fn decide(&self) -> DateOrder {
        match self.mdy.cmp(&self.dmy) {
            std::cmp::Ordering::Greater => DateOrder::Mdy,
            std::cmp::Ordering::Less => DateOrder::Dmy,
            std::cmp::Ordering::Equal if self.saw_meridiem => DateOrder::Mdy,
            std::cmp::Ordering::Equal => DateOrder::Dmy,
        }
    }
}

/// Detect the date order of an export from its (normalized) lines.
pub fn detect_date_order<S: AsRef<str>>(lines: &[S]) -> DateOrder {
    let votes = DateOrderVotes::tally(lines);
    let order = votes.decide();
    tracing::debug!(
        mdy_votes = votes.mdy,
        dmy_votes = votes.dmy,
        saw_meridiem = votes.saw_meridiem,
        order = %order,
        "detected date order"
    );
    order
}

/// Resolve the order for a run. Returns the order and whether it was forced.
pub fn resolve_date_order<S: AsRef<str>>(
    lines: &[S],
    forced: Option<DateOrder>,
) -> (DateOrder, bool) {
    match forced {
        Some(order) => (order, true),
        None => (detect_date_order(lines), false),
    }
}

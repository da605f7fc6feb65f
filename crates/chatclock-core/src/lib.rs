#![deny(clippy::all)]

mod aggregator;
pub mod chat;
pub mod date_order;
pub mod error;
pub mod export;
mod normalize;
pub mod options;
pub mod parser;
pub mod sessions;

pub use aggregator::*;
pub use chat::{parse_chat, ParsedChat, RejectedLine, MAX_REJECTED_EXAMPLES};
pub use date_order::{detect_date_order, resolve_date_order, DateOrderVotes};
pub use error::{ChatClockError, Result};
pub use export::{read_export, split_lines};
pub use normalize::normalize_line;
pub use options::{
    resolve_gap_minutes, AnalysisOptions, CountingPolicy, DateOrder, DEFAULT_GAP_MINUTES,
};
pub use parser::{parse_line, LineOutcome, RejectReason};
pub use sessions::{segment_sessions, split_by_day};

use std::fmt;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// One chat message with a validated local timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub timestamp: NaiveDateTime,
    pub sender: Option<String>,
    pub text: String,
}

/// A run of messages with no gap at or above the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub message_count: usize,
}

impl Session {
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}

/// The part of a session that falls on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlice {
    pub day: NaiveDate,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodUsage {
    /// `YYYY-MM-DD` for days, `YYYY-MM` for months.
    pub period: String,
    pub sessions: usize,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallTotals {
    pub sessions: usize,
    pub duration_ms: i64,
    pub messages: usize,
    pub longest_session_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedExample {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDiagnostics {
    pub date_order: DateOrder,
    pub date_order_forced: bool,
    pub message_count: usize,
    pub rejected_count: usize,
    pub rejected_examples: Vec<RejectedExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub version: String,
    pub gap_minutes: u32,
    #[serde(rename = "countBy")]
    pub counting_policy: CountingPolicy,
    pub date_range_start: String,
    pub date_range_end: String,
    pub processing_time_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeReport {
    pub meta: ReportMeta,
    pub diagnostics: ParseDiagnostics,
    pub daily: Vec<PeriodUsage>,
    pub monthly: Vec<PeriodUsage>,
    pub total: OverallTotals,
}

/// Run the whole pipeline over the lines of one export.
pub fn analyze<S: AsRef<str>>(lines: &[S], options: &AnalysisOptions) -> TimeReport {
    let start = Instant::now();

    let chat = parse_chat(lines, options.forced_date_order);
    let sessions = segment_sessions(&chat.messages, options.gap_minutes);
    let aggregates = aggregate(&sessions, options.counting_policy);

    let processing_time_ms = start.elapsed().as_millis() as u32;
    generate_report(&chat, &sessions, &aggregates, options, processing_time_ms)
}

/// Milliseconds rounded to the nearest whole minute (halves round up).
pub fn rounded_minutes(duration_ms: i64) -> i64 {
    (duration_ms + 30_000).div_euclid(60_000)
}

/// `"{h}h {m}m ({total} min)"` from a millisecond duration.
pub fn format_duration(duration_ms: i64) -> String {
    let minutes = rounded_minutes(duration_ms);
    format!("{}h {}m ({} min)", minutes / 60, minutes % 60, minutes)
}

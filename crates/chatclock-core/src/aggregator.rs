//! Aggregation of sessions into day and month totals
//!
//! Durations are always attributed slice by slice. Session counts follow the
//! selected [`CountingPolicy`].

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::chat::ParsedChat;
use crate::options::{AnalysisOptions, CountingPolicy};
use crate::sessions::split_by_day;
use crate::{
    MonthKey, OverallTotals, ParseDiagnostics, PeriodUsage, RejectedExample, ReportMeta, Session,
    TimeReport,
};

/// Running totals for one day or month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodTotals {
    pub sessions: usize,
    pub duration_ms: i64,
}

impl PeriodTotals {
    fn add_duration(&mut self, duration_ms: i64) {
        self.duration_ms = self.duration_ms.saturating_add(duration_ms);
    }

    fn add_session(&mut self) {
        self.sessions = self.sessions.saturating_add(1);
    }
}

/// Day-level and month-level totals, keyed in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub days: BTreeMap<NaiveDate, PeriodTotals>,
    pub months: BTreeMap<MonthKey, PeriodTotals>,
}

impl Aggregates {
    fn day_mut(&mut self, day: NaiveDate) -> &mut PeriodTotals {
        self.days.entry(day).or_default()
    }

    fn month_mut(&mut self, day: NaiveDate) -> &mut PeriodTotals {
        self.months.entry(MonthKey::from(day)).or_default()
    }

    fn add_session(&mut self, session: &Session, policy: CountingPolicy) {
        let slices = split_by_day(session);

        for slice in &slices {
            self.day_mut(slice.day).add_duration(slice.duration_ms);
            self.month_mut(slice.day).add_duration(slice.duration_ms);
        }

        match policy {
            CountingPolicy::Start => {
                let day = session.start.date();
                self.day_mut(day).add_session();
                self.month_mut(day).add_session();
            }
            CountingPolicy::Presence => {
                // slices are in day order, so consecutive dedup is enough
                let mut last_day = None;
                let mut last_month = None;
                for slice in &slices {
                    if last_day != Some(slice.day) {
                        self.day_mut(slice.day).add_session();
                        last_day = Some(slice.day);
                    }
                    let month = MonthKey::from(slice.day);
                    if last_month != Some(month) {
                        self.month_mut(slice.day).add_session();
                        last_month = Some(month);
                    }
                }
            }
        }
    }

    pub fn daily_usage(&self) -> Vec<PeriodUsage> {
        self.days
            .iter()
            .map(|(day, totals)| PeriodUsage {
                period: day.format("%Y-%m-%d").to_string(),
                sessions: totals.sessions,
                duration_ms: totals.duration_ms,
            })
            .collect()
    }

    pub fn monthly_usage(&self) -> Vec<PeriodUsage> {
        self.months
            .iter()
            .map(|(month, totals)| PeriodUsage {
                period: month.to_string(),
                sessions: totals.sessions,
                duration_ms: totals.duration_ms,
            })
            .collect()
    }
}

/// Fold sessions into day and month totals under `policy`.
pub fn aggregate(sessions: &[Session], policy: CountingPolicy) -> Aggregates {
    let mut aggregates = Aggregates::default();
    for session in sessions {
        aggregates.add_session(session, policy);
    }
    aggregates
}

/// Overall totals across all sessions.
pub fn calculate_totals(sessions: &[Session]) -> OverallTotals {
    OverallTotals {
        sessions: sessions.len(),
        duration_ms: sessions.iter().map(Session::duration_ms).sum(),
        messages: sessions.iter().map(|s| s.message_count).sum(),
        longest_session_ms: sessions
            .iter()
            .map(Session::duration_ms)
            .max()
            .unwrap_or(0),
    }
}

/// Assemble the full report
pub fn generate_report(
    chat: &ParsedChat,
    sessions: &[Session],
    aggregates: &Aggregates,
    options: &AnalysisOptions,
    processing_time_ms: u32,
) -> TimeReport {
    let daily = aggregates.daily_usage();
    let monthly = aggregates.monthly_usage();

    TimeReport {
        meta: ReportMeta {
            version: crate::version(),
            gap_minutes: options.gap_minutes,
            counting_policy: options.counting_policy,
            date_range_start: daily.first().map(|d| d.period.clone()).unwrap_or_default(),
            date_range_end: daily.last().map(|d| d.period.clone()).unwrap_or_default(),
            processing_time_ms,
        },
        diagnostics: ParseDiagnostics {
            date_order: chat.date_order,
            date_order_forced: chat.date_order_forced,
            message_count: chat.messages.len(),
            rejected_count: chat.rejected_count,
            rejected_examples: chat
                .rejected_examples
                .iter()
                .map(|r| RejectedExample {
                    line_number: r.line_number,
                    line: r.line.clone(),
                    reason: r.reason.to_string(),
                })
                .collect(),
        },
        total: calculate_totals(sessions),
        daily,
        monthly,
    }
}

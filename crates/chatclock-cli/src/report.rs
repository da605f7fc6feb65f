use std::fmt::Write;

use chatclock_core::{format_duration, rounded_minutes, PeriodUsage, TimeReport};
use colored::Colorize;
use comfy_table::{CellAlignment, ContentArrangement, Table};

/// Which tables the text report includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    All,
    Daily,
    Monthly,
}

impl View {
    pub fn from_flags(daily_only: bool, monthly_only: bool) -> Self {
        match (daily_only, monthly_only) {
            (true, _) => View::Daily,
            (_, true) => View::Monthly,
            _ => View::All,
        }
    }

    fn shows_daily(&self) -> bool {
        matches!(self, View::All | View::Daily)
    }

    fn shows_monthly(&self) -> bool {
        matches!(self, View::All | View::Monthly)
    }
}

/// `"{h}h {m}m"` after rounding to whole minutes.
pub fn format_hours_minutes(duration_ms: i64) -> String {
    let minutes = rounded_minutes(duration_ms);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

fn period_table(first_header: &str, rows: &[PeriodUsage]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![first_header, "Sessions", "Time", "Minutes"]);

    for row in rows {
        table.add_row(vec![
            row.period.clone(),
            row.sessions.to_string(),
            format_hours_minutes(row.duration_ms),
            rounded_minutes(row.duration_ms).to_string(),
        ]);
    }

    for index in 1..=3 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table
}

fn render_diagnostics(out: &mut String, report: &TimeReport) {
    let diagnostics = &report.diagnostics;
    let order_source = if diagnostics.date_order_forced {
        "forced"
    } else {
        "detected"
    };

    let _ = writeln!(out, "\n  {}\n", "Chat time report".cyan());
    let _ = writeln!(
        out,
        "  Date order: {} ({}) | Gap: {} min | Counting: {}",
        diagnostics.date_order, order_source, report.meta.gap_minutes, report.meta.counting_policy
    );
    let _ = writeln!(
        out,
        "  Messages parsed: {} | Rejected timestamps: {}",
        diagnostics.message_count, diagnostics.rejected_count
    );

    if !diagnostics.rejected_examples.is_empty() {
        let _ = writeln!(out, "  {}", "Rejected examples:".yellow());
        for example in &diagnostics.rejected_examples {
            let _ = writeln!(
                out,
                "    line {}: {} {}",
                example.line_number,
                example.line.trim(),
                format!("({})", example.reason).bright_black()
            );
        }
    }
}

/// Render the report as console text.
pub fn render_text(report: &TimeReport, view: View) -> String {
    let mut out = String::new();
    render_diagnostics(&mut out, report);

    if report.total.sessions == 0 {
        let _ = writeln!(out, "\n  No sessions found.");
    } else {
        if view.shows_daily() {
            let _ = writeln!(out, "\n  {}", "Daily".bold());
            let _ = writeln!(out, "{}", period_table("Date", &report.daily));
        }
        if view.shows_monthly() {
            let _ = writeln!(out, "\n  {}", "Monthly".bold());
            let _ = writeln!(out, "{}", period_table("Month", &report.monthly));
        }
    }

    let _ = write!(
        out,
        "\nTotal: {} sessions | {}",
        report.total.sessions,
        format_duration(report.total.duration_ms)
    );

    out
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PeriodJson {
    period: String,
    sessions: usize,
    duration_ms: i64,
    minutes: i64,
}

impl From<&PeriodUsage> for PeriodJson {
    fn from(usage: &PeriodUsage) -> Self {
        Self {
            period: usage.period.clone(),
            sessions: usage.sessions,
            duration_ms: usage.duration_ms,
            minutes: rounded_minutes(usage.duration_ms),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalJson {
    sessions: usize,
    messages: usize,
    duration_ms: i64,
    minutes: i64,
    longest_session_ms: i64,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportJson<'a> {
    meta: &'a chatclock_core::ReportMeta,
    diagnostics: &'a chatclock_core::ParseDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    daily: Option<Vec<PeriodJson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly: Option<Vec<PeriodJson>>,
    total: TotalJson,
}

/// Render the report as pretty JSON, with rounded minutes alongside
/// every millisecond duration.
pub fn render_json(report: &TimeReport, view: View) -> serde_json::Result<String> {
    let output = ReportJson {
        meta: &report.meta,
        diagnostics: &report.diagnostics,
        daily: view
            .shows_daily()
            .then(|| report.daily.iter().map(PeriodJson::from).collect()),
        monthly: view
            .shows_monthly()
            .then(|| report.monthly.iter().map(PeriodJson::from).collect()),
        total: TotalJson {
            sessions: report.total.sessions,
            messages: report.total.messages,
            duration_ms: report.total.duration_ms,
            minutes: rounded_minutes(report.total.duration_ms),
            longest_session_ms: report.total.longest_session_ms,
        },
    };
    serde_json::to_string_pretty(&output)
}

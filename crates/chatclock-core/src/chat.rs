//! Whole-export parsing: normalize, resolve date order, parse, sort.

use crate::date_order::resolve_date_order;
use crate::normalize::normalize_line;
use crate::options::DateOrder;
use crate::parser::{parse_line, LineOutcome, RejectReason};
use crate::Message;

/// How many rejected lines are kept as examples for diagnostics.
pub const MAX_REJECTED_EXAMPLES: usize = 5;

/// A timestamp-shaped line that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number in the export.
    pub line_number: usize,
    /// The normalized line.
    pub line: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone)]
pub struct ParsedChat {
    /// Messages sorted by timestamp; ties keep export order.
    pub messages: Vec<Message>,
    pub date_order: DateOrder,
    pub date_order_forced: bool,
    /// Total number of rejected timestamp candidates.
    pub rejected_count: usize,
    /// The first few rejected candidates, at most [`MAX_REJECTED_EXAMPLES`].
    pub rejected_examples: Vec<RejectedLine>,
}

/// Parse a full export. Never fails: unparseable input yields no messages.
pub fn parse_chat<S: AsRef<str>>(lines: &[S], forced_order: Option<DateOrder>) -> ParsedChat {
    let normalized: Vec<String> = lines.iter().map(|l| normalize_line(l.as_ref())).collect();
    let (date_order, date_order_forced) = resolve_date_order(&normalized, forced_order);

    let mut messages = Vec::new();
    let mut rejected_count = 0;
    let mut rejected_examples = Vec::with_capacity(MAX_REJECTED_EXAMPLES);

    for (index, line) in normalized.into_iter().enumerate() {
        match parse_line(&line, date_order) {
            LineOutcome::Parsed(msg) => messages.push(msg),
            LineOutcome::InvalidTimestamp(reason) => {
                rejected_count += 1;
                tracing::trace!(line_number = index + 1, %reason, "rejected timestamp");
                if rejected_examples.len() < MAX_REJECTED_EXAMPLES {
                    rejected_examples.push(RejectedLine {
                        line_number: index + 1,
                        line,
                        reason,
                    });
                }
            }
            LineOutcome::NotATimestamp => {}
        }
    }

    // stable: equal timestamps keep their export order
    messages.sort_by_key(|m| m.timestamp);

    tracing::debug!(
        messages = messages.len(),
        rejected = rejected_count,
        order = %date_order,
        forced = date_order_forced,
        "parsed chat export"
    );

    ParsedChat {
        messages,
        date_order,
        date_order_forced,
        rejected_count,
        rejected_examples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_parse_chat_empty() {
        let lines: Vec<String> = Vec::new();
        let chat = parse_chat(&lines, None);
        assert!(chat.messages.is_empty());
        assert_eq!(chat.rejected_count, 0);
        assert!(chat.rejected_examples.is_empty());
        assert!(!chat.date_order_forced);
    }

    #[test]
    fn test_parse_chat_skips_continuations() {
        let lines = [
            "1/2/25, 10:00 AM - A: first line",
            "second line of the same message",
            "",
            "1/2/25, 10:02 AM - B: reply",
        ];
        let chat = parse_chat(&lines, None);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.rejected_count, 0);
        assert_eq!(chat.messages[0].text, "first line");
    }

    #[test]
    fn test_parse_chat_sorts_by_timestamp() {
        let lines = [
            "1/2/25, 10:05 - A: later",
            "1/2/25, 10:00 - A: earlier",
            "1/1/25, 23:00 - A: previous day",
        ];
        let chat = parse_chat(&lines, Some(DateOrder::Mdy));
        let texts: Vec<&str> = chat.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["previous day", "earlier", "later"]);
    }

    #[test]
    fn test_parse_chat_sort_is_stable() {
        let lines = [
            "1/2/25, 10:00 - A: one",
            "1/2/25, 9:00 - A: zero",
            "1/2/25, 10:00 - B: two",
            "1/2/25, 10:00 - C: three",
        ];
        let chat = parse_chat(&lines, Some(DateOrder::Mdy));
        let texts: Vec<&str> = chat.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["zero", "one", "two", "three"]);
    }

    #[test]
    fn test_parse_chat_collects_rejections() {
        let lines = [
            "31/4/2025, 10:00 - A: hi",
            "30/4/2025, 10:00 - A: fine",
        ];
        let chat = parse_chat(&lines, Some(DateOrder::Dmy));
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.rejected_count, 1);
        assert_eq!(chat.rejected_examples.len(), 1);
        let rejected = &chat.rejected_examples[0];
        assert_eq!(rejected.line_number, 1);
        assert_eq!(rejected.line, "31/4/2025, 10:00 - A: hi");
        assert_eq!(rejected.reason, RejectReason::Rollover);
    }

    #[test]
    fn test_parse_chat_caps_rejected_examples() {
        let lines: Vec<String> = (0..8)
            .map(|i| format!("1/2/25, 10:{} - A: bad minute", 60 + i))
            .collect();
        let chat = parse_chat(&lines, Some(DateOrder::Mdy));
        assert!(chat.messages.is_empty());
        assert_eq!(chat.rejected_count, 8);
        assert_eq!(chat.rejected_examples.len(), MAX_REJECTED_EXAMPLES);
        assert_eq!(chat.rejected_examples[4].line_number, 5);
    }

    #[test]
    fn test_parse_chat_detected_order_applies_to_every_line() {
        // The 25/1 line makes the whole export day-first, so 3/4 is 3 April.
        let lines = ["25/1/25, 10:00 - A: x", "3/4/25, 10:00 - A: y"];
        let chat = parse_chat(&lines, None);
        assert_eq!(chat.date_order, DateOrder::Dmy);
        assert_eq!(
            chat.messages[1].timestamp.date(),
            NaiveDate::from_ymd_opt(2025, 4, 3).unwrap()
        );
    }

    #[test]
    fn test_parse_chat_normalizes_before_matching() {
        let lines = ["\u{200E}١/٢/٢٥، ١٠:٣٠\u{202F}PM - A: مرحبا"];
        let chat = parse_chat(&lines, None);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.date_order, DateOrder::Mdy);
        assert_eq!(chat.messages[0].timestamp.hour(), 22);
        assert_eq!(chat.messages[0].text, "مرحبا");
    }
}

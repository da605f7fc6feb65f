//! Session segmentation and day splitting
//!
//! A session is a maximal run of time-sorted messages in which every gap
//! between neighbours is shorter than the threshold. Sessions are then cut
//! at local midnights so their time can be attributed to calendar days.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::{DaySlice, Message, Session};

/// Group time-sorted messages into sessions.
///
/// A gap exactly equal to the threshold starts a new session. Messages with
/// identical timestamps always share a session, so a threshold of zero
/// merges only those.
pub fn segment_sessions(messages: &[Message], gap_minutes: u32) -> Vec<Session> {
    let Some((first, rest)) = messages.split_first() else {
        return Vec::new();
    };

    let threshold = Duration::minutes(i64::from(gap_minutes));
    let mut sessions = Vec::new();
    let mut current = Session {
        start: first.timestamp,
        end: first.timestamp,
        message_count: 1,
    };

    for msg in rest {
        let gap = msg.timestamp - current.end;
        if gap < threshold || gap == Duration::zero() {
            current.end = msg.timestamp;
            current.message_count += 1;
        } else {
            sessions.push(current);
            current = Session {
                start: msg.timestamp,
                end: msg.timestamp,
                message_count: 1,
            };
        }
    }
    sessions.push(current);

    tracing::debug!(
        sessions = sessions.len(),
        messages = messages.len(),
        gap_minutes,
        "segmented sessions"
    );

    sessions
}

fn next_midnight(at: NaiveDateTime) -> NaiveDateTime {
    // succ_opt only fails at NaiveDate::MAX, where the session cannot
    // extend any further anyway.
    at.date()
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |d| d.and_time(NaiveTime::MIN))
}

/// Cut a session at each local midnight it spans.
///
/// A zero-length session yields a single zero-length slice on its start
/// day. The slice durations always add up to `end - start` exactly.
pub fn split_by_day(session: &Session) -> Vec<DaySlice> {
    if session.start >= session.end {
        return vec![DaySlice {
            day: session.start.date(),
            duration_ms: 0,
        }];
    }

    let mut slices = Vec::new();
    let mut cursor = session.start;
    while cursor < session.end {
        let stop = next_midnight(cursor).min(session.end);
        slices.push(DaySlice {
            day: cursor.date(),
            duration_ms: (stop - cursor).num_milliseconds(),
        });
        cursor = stop;
    }

    slices
}

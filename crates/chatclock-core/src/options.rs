//! Analysis options: date order, counting policy and gap threshold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChatClockError;

/// Gap threshold used when nothing valid was configured.
pub const DEFAULT_GAP_MINUTES: u32 = 5;

/// Which of the two leading numeric fields of a timestamp is the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateOrder {
    /// `month/day/year`
    Mdy,
    /// `day/month/year`
    Dmy,
}

impl DateOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateOrder::Mdy => "mdy",
            DateOrder::Dmy => "dmy",
        }
    }

    /// Map the two leading fields of a timestamp to `(month, day)`.
    pub fn month_day(&self, first: u32, second: u32) -> (u32, u32) {
        match self {
            DateOrder::Mdy => (first, second),
            DateOrder::Dmy => (second, first),
        }
    }
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for DateOrder {
    type Err = ChatClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mdy" | "us" => Ok(DateOrder::Mdy),
            "dmy" | "eu" => Ok(DateOrder::Dmy),
            _ => Err(ChatClockError::InvalidDateOrder(s.to_string())),
        }
    }
}

/// How a session is attributed to day and month buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountingPolicy {
    /// Count the session once, on the day it started.
    #[default]
    Start,
    /// Count the session on every day (and month) it touches.
    Presence,
}

impl CountingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountingPolicy::Start => "start",
            CountingPolicy::Presence => "presence",
        }
    }
}

impl fmt::Display for CountingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountingPolicy {
    type Err = ChatClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(CountingPolicy::Start),
            "presence" => Ok(CountingPolicy::Presence),
            _ => Err(ChatClockError::InvalidCountingPolicy(s.to_string())),
        }
    }
}

/// Fully resolved configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub gap_minutes: u32,
    pub forced_date_order: Option<DateOrder>,
    pub counting_policy: CountingPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            gap_minutes: DEFAULT_GAP_MINUTES,
            forced_date_order: None,
            counting_policy: CountingPolicy::Start,
        }
    }
}

/// Parse a user-supplied gap threshold.
///
/// Anything that is not a non-negative integer fitting in `u32` falls back
/// to [`DEFAULT_GAP_MINUTES`].
pub fn resolve_gap_minutes(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(minutes) => minutes,
        Err(_) => {
            tracing::warn!(
                value = raw,
                default = DEFAULT_GAP_MINUTES,
                "invalid gap threshold, using default"
            );
            DEFAULT_GAP_MINUTES
        }
    }
}

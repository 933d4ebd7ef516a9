//! TTL Module
//!
//! Normalizes the flexible TTL inputs accepted by `set` into whole seconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const DAYS_PER_WEEK: i64 = 7;

// == TTL ==
/// A time-to-live as passed to `set`.
///
/// `Seconds(0)` and an absent TTL both mean "never expires". Negative values
/// are kept as-is and mean "already expired".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Whole seconds
    Seconds(i64),
    /// Calendar-free interval made of day/hour/minute/second parts
    Interval(TtlInterval),
}

impl Ttl {
    /// Returns the TTL in whole seconds.
    pub fn as_seconds(&self) -> i64 {
        match self {
            Ttl::Seconds(secs) => *secs,
            Ttl::Interval(interval) => interval.total_seconds(),
        }
    }

    // == From JSON ==
    /// Interprets a JSON value as a TTL.
    ///
    /// Accepts integers, floats (truncated toward zero), numeric strings,
    /// interval objects like `{"minutes": 5}` and phrases like `"2 seconds"`.
    /// Returns `None` for anything else, which normalizes to "never expires".
    pub fn from_json(value: &Value) -> Option<Ttl> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .map(Ttl::Seconds),
            Value::String(s) => parse_numeric(s)
                .map(Ttl::Seconds)
                .or_else(|| TtlInterval::parse(s).map(Ttl::Interval)),
            Value::Object(_) => serde_json::from_value::<TtlInterval>(value.clone())
                .ok()
                .map(Ttl::Interval),
            _ => None,
        }
    }
}

impl From<i64> for Ttl {
    fn from(secs: i64) -> Self {
        Ttl::Seconds(secs)
    }
}

impl From<TtlInterval> for Ttl {
    fn from(interval: TtlInterval) -> Self {
        Ttl::Interval(interval)
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl::Seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
    }
}

impl From<chrono::Duration> for Ttl {
    fn from(duration: chrono::Duration) -> Self {
        Ttl::Seconds(duration.num_seconds())
    }
}

// == TTL Interval ==
/// An interval expressed as separate day, hour, minute and second parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TtlInterval {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TtlInterval {
    /// Creates an interval from its parts.
    pub fn new(days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Sums the parts into whole seconds, saturating at the i64 bounds.
    pub fn total_seconds(&self) -> i64 {
        self.days
            .saturating_mul(SECONDS_PER_DAY)
            .saturating_add(self.hours.saturating_mul(SECONDS_PER_HOUR))
            .saturating_add(self.minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(self.seconds)
    }

    // == Parse ==
    /// Parses a relative phrase such as `"2 seconds"` or `"1 day 3 hours"`.
    ///
    /// Units may be singular or plural: week, day, hour, minute/min,
    /// second/sec. Returns `None` if any token is not understood.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.to_ascii_lowercase();
        let mut tokens = lowered
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());

        let mut interval = TtlInterval::default();
        let mut matched = false;

        while let Some(amount) = tokens.next() {
            let amount: i64 = amount.parse().ok()?;
            let unit = tokens.next()?;

            match unit.strip_suffix('s').unwrap_or(unit) {
                "week" => {
                    interval.days = interval
                        .days
                        .saturating_add(amount.saturating_mul(DAYS_PER_WEEK))
                }
                "day" => interval.days = interval.days.saturating_add(amount),
                "hour" => interval.hours = interval.hours.saturating_add(amount),
                "minute" | "min" => interval.minutes = interval.minutes.saturating_add(amount),
                "second" | "sec" => interval.seconds = interval.seconds.saturating_add(amount),
                _ => return None,
            }
            matched = true;
        }

        matched.then_some(interval)
    }
}

// == To Seconds ==
/// Normalizes an optional TTL into whole seconds; absent means 0.
pub fn to_seconds(ttl: Option<Ttl>) -> i64 {
    ttl.map(|t| t.as_seconds()).unwrap_or(0)
}

fn parse_numeric(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

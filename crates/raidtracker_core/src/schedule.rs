//! Weekly reset boundary computation.
//!
//! # Responsibility
//! - Compute the most recent weekly reset instant for a given "now".
//! - Decide whether a stored last-visit timestamp predates that instant.
//!
//! # Invariants
//! - Pure functions only; callers supply the clock.
//! - Day distance is always `(current - boundary + 7) mod 7`; there is no
//!   same-day special case.
//! - A missing or unparsable last-visit value never triggers a reset.

use chrono::{DateTime, Datelike, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeDelta};
use chrono::{TimeZone, Weekday};

/// Largest magnitude accepted for an epoch-millisecond timestamp.
const MAX_EPOCH_MILLIS: i64 = 8_640_000_000_000_000;

/// Weekly reset definition: local weekday and clock time, then a fixed
/// correction subtracted from the resolved instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSchedule {
    pub weekday: Weekday,
    pub local_time: NaiveTime,
    pub offset_correction: TimeDelta,
}

impl Default for ResetSchedule {
    /// Wednesday 06:00 local, corrected by two hours for a UTC+2 wall clock.
    fn default() -> Self {
        Self {
            weekday: Weekday::Wed,
            local_time: NaiveTime::MIN + TimeDelta::hours(6),
            offset_correction: TimeDelta::hours(2),
        }
    }
}

impl ResetSchedule {
    /// Returns the most recent boundary instant relative to `now`.
    ///
    /// On the boundary weekday itself this is always today's boundary, even
    /// when its clock time has not been reached yet.
    pub fn last_boundary<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let days_back = days_since(now.weekday(), self.weekday);
        let date = now.date_naive() - TimeDelta::days(days_back);
        let local = resolve_local(now, date.and_time(self.local_time));
        local - self.offset_correction
    }

    /// Decides whether completion marks should be cleared at startup.
    pub fn decide<Tz: TimeZone>(
        &self,
        last_visit_raw: Option<&str>,
        now: &DateTime<Tz>,
    ) -> ResetDecision {
        let Some(raw) = last_visit_raw else {
            return ResetDecision::FirstVisit;
        };
        let Some(last_visit_ms) = parse_epoch_millis(raw) else {
            return ResetDecision::UnparsableTimestamp;
        };

        if last_visit_ms < self.last_boundary(now).timestamp_millis() {
            ResetDecision::Due
        } else {
            ResetDecision::NotDue
        }
    }
}

/// Outcome of comparing the last visit against the current boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    /// No last-visit value was stored.
    FirstVisit,
    /// Last visit is strictly before the boundary.
    Due,
    /// Last visit is at or after the boundary.
    NotDue,
    /// Stored value could not be read as epoch milliseconds.
    UnparsableTimestamp,
}

impl ResetDecision {
    pub fn is_due(self) -> bool {
        matches!(self, Self::Due)
    }

    /// Stable label used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstVisit => "first_visit",
            Self::Due => "due",
            Self::NotDue => "not_due",
            Self::UnparsableTimestamp => "unparsable_timestamp",
        }
    }
}

/// Days elapsed since the most recent `boundary` weekday, in `0..7`.
pub fn days_since(current: Weekday, boundary: Weekday) -> i64 {
    let current = i64::from(current.num_days_from_sunday());
    let boundary = i64::from(boundary.num_days_from_sunday());
    (current - boundary + 7) % 7
}

/// Parses a stored last-visit value.
///
/// Accepts a leading decimal integer with optional sign; anything after the
/// digits is ignored. Values outside the representable date range are
/// rejected.
pub fn parse_epoch_millis(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().ok()?;
    if magnitude > MAX_EPOCH_MILLIS {
        return None;
    }
    Some(if negative { -magnitude } else { magnitude })
}

/// Maps a local wall-clock time to an instant in `now`'s zone.
///
/// Ambiguous times take the earlier instant. Times skipped by a DST jump
/// reuse `now`'s UTC offset.
fn resolve_local<Tz: TimeZone>(now: &DateTime<Tz>, naive: NaiveDateTime) -> DateTime<Tz> {
    let tz = now.timezone();
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let offset_secs = now.offset().fix().local_minus_utc();
            tz.from_utc_datetime(&(naive - TimeDelta::seconds(i64::from(offset_secs))))
        }
    }
}

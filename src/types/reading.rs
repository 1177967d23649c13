//! Timestamped progress readings

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use std::fmt;

/// Wall-clock format used in the progress log and in projections
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time with second precision
///
/// Timestamps are naive local times, exactly as written to the log. For
/// arithmetic they are resolved in the host time zone and mapped onto Unix
/// epoch seconds, so a DST change does not open a gap in the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Create from a naive local time, dropping sub-second precision
    #[must_use]
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime.with_nanosecond(0).unwrap_or(datetime))
    }

    /// Current local wall-clock time
    #[must_use]
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .ok()
            .map(Self::new)
    }

    /// Unix epoch seconds of this local time
    ///
    /// A time repeated by a DST fall-back resolves to its first occurrence.
    /// A time skipped by a spring-forward is read one hour later.
    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        if let Some(dt) = Local.from_local_datetime(&self.0).earliest() {
            return dt.timestamp();
        }
        let shifted = self.0 + TimeDelta::hours(1);
        Local
            .from_local_datetime(&shifted)
            .earliest()
            .map_or_else(|| self.0.and_utc().timestamp(), |dt| dt.timestamp() - 3600)
    }

    /// Local time at the given Unix epoch seconds
    #[must_use]
    pub fn from_epoch_seconds(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(|dt| Self(dt.with_timezone(&Local).naive_local()))
    }

    /// Build from fractional seconds, rounding to the nearest second
    ///
    /// Returns `None` for non-finite or out-of-range values.
    #[must_use]
    pub fn from_epoch_seconds_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs.abs() > i64::MAX as f64 {
            return None;
        }
        Self::from_epoch_seconds(secs.round() as i64)
    }

    /// Underlying naive datetime
    #[must_use]
    #[inline]
    pub const fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Signed elapsed time from `earlier` to `self`
    #[must_use]
    pub fn signed_duration_since(&self, earlier: Timestamp) -> chrono::Duration {
        TimeDelta::seconds(self.epoch_seconds() - earlier.epoch_seconds())
    }

    /// Format with an arbitrary chrono format string
    #[must_use]
    pub fn format_with(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::new(datetime)
    }
}

/// A finite progress percentage
///
/// Values outside [0, 100] are kept as-is: the source may overshoot and the
/// trend fit should see what was actually reported.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f64);

impl Percent {
    /// Create from a raw value, rejecting NaN and infinities
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// Get raw value
    #[must_use]
    #[inline]
    pub const fn get(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// The value part of a reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// The source reported a number
    Percent(Percent),
    /// The source failed, timed out, or reported no number
    Unavailable,
}

impl Sample {
    /// Numeric value, if any
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Percent(p) => Some(p.get()),
            Self::Unavailable => None,
        }
    }

    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl From<f64> for Sample {
    /// Non-finite values map to [`Sample::Unavailable`]
    fn from(value: f64) -> Self {
        Percent::new(value).map_or(Self::Unavailable, Self::Percent)
    }
}

/// One sample of the tracked value, never mutated after creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: Timestamp,
    pub sample: Sample,
}

impl Reading {
    #[must_use]
    pub const fn new(timestamp: Timestamp, sample: Sample) -> Self {
        Self { timestamp, sample }
    }

    /// Reading with a numeric value
    #[must_use]
    pub fn percent(timestamp: Timestamp, value: f64) -> Self {
        Self::new(timestamp, Sample::from(value))
    }

    /// Reading marking the source as unavailable
    #[must_use]
    pub const fn unavailable(timestamp: Timestamp) -> Self {
        Self::new(timestamp, Sample::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> Timestamp {
        Timestamp::new(
            NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        )
    }

    #[test]
    fn test_timestamp_parse_and_display() {
        let t = Timestamp::parse("2025-03-01 12:34:56").unwrap();
        assert_eq!(t, ts(12, 34, 56));
        assert_eq!(t.to_string(), "2025-03-01 12:34:56");
    }

    #[test]
    fn test_timestamp_rejects_other_formats() {
        assert!(Timestamp::parse("2025-03-01T12:34:56").is_none());
        assert!(Timestamp::parse("2025-03-01 12:34").is_none());
        assert!(Timestamp::parse("").is_none());
    }

    #[test]
    fn test_timestamp_drops_subseconds() {
        let precise = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_milli_opt(1, 2, 3, 999)
            .unwrap();
        assert_eq!(Timestamp::new(precise), ts(1, 2, 3));
    }

    #[test]
    fn test_epoch_seconds_round_trip() {
        let t = ts(8, 0, 0);
        let secs = t.epoch_seconds();
        assert_eq!(Timestamp::from_epoch_seconds(secs), Some(t));
        assert_eq!(Timestamp::from_epoch_seconds_f64(secs as f64 + 0.4), Some(t));
        assert_eq!(ts(8, 1, 0).epoch_seconds() - secs, 60);
    }

    #[test]
    fn test_epoch_seconds_is_unix_time() {
        let unix_now = chrono::Utc::now().timestamp();
        let local_now = Timestamp::now().epoch_seconds();
        assert!((local_now - unix_now).abs() <= 1, "{} vs {}", local_now, unix_now);
    }

    #[test]
    fn test_duration_follows_epoch_axis() {
        let earlier = ts(8, 0, 0);
        let later = Timestamp::from_epoch_seconds(earlier.epoch_seconds() + 7_200).unwrap();
        assert_eq!(later.signed_duration_since(earlier).num_seconds(), 7_200);
        assert_eq!(earlier.signed_duration_since(later).num_seconds(), -7_200);
    }

    #[test]
    fn test_epoch_seconds_f64_rejects_non_finite() {
        assert!(Timestamp::from_epoch_seconds_f64(f64::NAN).is_none());
        assert!(Timestamp::from_epoch_seconds_f64(f64::INFINITY).is_none());
        assert!(Timestamp::from_epoch_seconds_f64(1e300).is_none());
    }

    #[test]
    fn test_percent_rejects_non_finite() {
        assert!(Percent::new(f64::NAN).is_none());
        assert!(Percent::new(f64::NEG_INFINITY).is_none());
        assert_eq!(Percent::new(42.5).unwrap().get(), 42.5);
        assert_eq!(Percent::new(101.0).unwrap().get(), 101.0);
    }

    #[test]
    fn test_sample_from_f64() {
        assert_eq!(Sample::from(f64::NAN), Sample::Unavailable);
        assert_eq!(Sample::from(0.0).value(), Some(0.0));
        assert!(!Sample::from(0.0).is_unavailable());
    }
}

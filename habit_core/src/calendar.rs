//! Calendar-day identity and the evaluation-time source.
//!
//! A [`CalendarDay`] is an instant with its time-of-day discarded, taken in a
//! single fixed reference zone. Two instants on the same reference-zone day
//! compare equal. The [`Clock`] trait supplies "now" so streak evaluation is
//! deterministic under test.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// A (year, month, day) date identity in the reference zone
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Normalize an instant to its calendar day in `zone`
    pub fn from_instant(instant: DateTime<Utc>, zone: &FixedOffset) -> Self {
        Self(instant.with_timezone(zone).date_naive())
    }

    /// Build a day from its fields; None for impossible dates
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The following day, or None at the end of the representable range
    pub fn next(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding day, or None at the start of the representable range
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// Signed number of days from `self` to `later`
    pub fn days_until(&self, later: CalendarDay) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// Midnight of this day in `zone`, expressed in UTC
    pub fn start_of_day(&self, zone: &FixedOffset) -> DateTime<Utc> {
        let local_midnight = self.0.and_time(NaiveTime::MIN);
        (local_midnight - Duration::seconds(i64::from(zone.local_minus_utc()))).and_utc()
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<CalendarDay> for NaiveDate {
    fn from(day: CalendarDay) -> Self {
        day.0
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .map(Self)
            .map_err(|e| Error::InvalidArgument(format!("Invalid date {:?}: {}", s, e)))
    }
}

/// Source of the evaluation instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant, movable by hand
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// A clock reading midday of `day` in `zone`
    pub fn at_day(day: CalendarDay, zone: &FixedOffset) -> Self {
        Self::new(day.start_of_day(zone) + Duration::hours(12))
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn advance_days(&mut self, days: i64) {
        self.now += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_same_day_instants_are_equal() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 10, 0, 5, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();

        assert_eq!(
            CalendarDay::from_instant(morning, &utc()),
            CalendarDay::from_instant(night, &utc())
        );
    }

    #[test]
    fn test_reference_zone_moves_day_boundary() {
        // 23:30 UTC is already the next day at UTC+2
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let day = CalendarDay::from_instant(instant, &plus_two);
        assert_eq!((day.year(), day.month(), day.day()), (2024, 3, 11));
    }

    #[test]
    fn test_ordering_ignores_time_of_day() {
        let a = CalendarDay::from_ymd(2024, 1, 31).unwrap();
        let b = CalendarDay::from_ymd(2024, 2, 1).unwrap();
        assert!(a < b);
        assert_eq!(a.next(), Some(b));
        assert_eq!(b.previous(), Some(a));
        assert_eq!(a.days_until(b), 1);
        assert_eq!(b.days_until(a), -1);
    }

    #[test]
    fn test_start_of_day_roundtrips_through_zone() {
        let zone = FixedOffset::west_opt(5 * 3600).unwrap();
        let day = CalendarDay::from_ymd(2024, 6, 1).unwrap();

        let start = day.start_of_day(&zone);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 1, 5, 0, 0).unwrap());
        assert_eq!(CalendarDay::from_instant(start, &zone), day);
    }

    #[test]
    fn test_parse_and_display() {
        let day: CalendarDay = "2024-02-29".parse().unwrap();
        assert_eq!(day.to_string(), "2024-02-29");

        assert!("2023-02-29".parse::<CalendarDay>().is_err());
        assert!("yesterday".parse::<CalendarDay>().is_err());
    }

    #[test]
    fn test_fixed_clock_advances() {
        let day = CalendarDay::from_ymd(2024, 1, 1).unwrap();
        let mut clock = FixedClock::at_day(day, &utc());
        assert_eq!(CalendarDay::from_instant(clock.now(), &utc()), day);

        clock.advance_days(2);
        assert_eq!(
            CalendarDay::from_instant(clock.now(), &utc()),
            CalendarDay::from_ymd(2024, 1, 3).unwrap()
        );
    }
}

//! Sweep Schedule
//!
//! Time source abstraction and the calendar rules for the monthly sweep.
//!
//! Every order is deleted during the first hour of each month, local time.
//! Clients are shown how long remains until the next month begins.

mod duration;

pub use duration::format_duration;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeDelta, TimeZone, Timelike};
use parking_lot::RwLock;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current local time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Local>>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Local>) {
        *self.now.write() = now;
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.write();
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.read()
    }
}

// =============================================================================
// Calendar Rules
// =============================================================================

/// Whether `now` falls inside the sweep window (day 1, hour 0).
#[must_use]
pub fn in_sweep_window<Tz: TimeZone>(now: &DateTime<Tz>) -> bool {
    now.day() == 1 && now.hour() == 0
}

/// Time from `now` until midnight on the first day of the next month, in
/// `now`'s time zone.
///
/// If that midnight does not exist locally (a DST gap), the first valid
/// instant after the gap is used.
#[must_use]
pub fn time_until_next_month<Tz: TimeZone>(now: &DateTime<Tz>) -> TimeDelta {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };

    let Some(midnight) =
        NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return TimeDelta::zero();
    };

    let tz = now.timezone();
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .map_or_else(TimeDelta::zero, |next| next.signed_duration_since(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use test_case::test_case;

    #[test_case(2024, 3, 1, 0, 0 => true; "window opens at midnight")]
    #[test_case(2024, 3, 1, 0, 59 => true; "window still open at 00:59")]
    #[test_case(2024, 3, 1, 1, 0 => false; "window closed at 01:00")]
    #[test_case(2024, 3, 2, 0, 30 => false; "second day is outside")]
    #[test_case(2024, 3, 31, 23, 59 => false; "last minute of month is outside")]
    fn sweep_window(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> bool {
        let now = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap();
        in_sweep_window(&now)
    }

    #[test]
    fn until_next_month_mid_month() {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap();
        let expected = TimeDelta::days(15) + TimeDelta::hours(12);
        assert_eq!(time_until_next_month(&now), expected);
    }

    #[test]
    fn until_next_month_crosses_year() {
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(time_until_next_month(&now), TimeDelta::hours(1));
    }

    #[test]
    fn until_next_month_handles_leap_february() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(time_until_next_month(&now), TimeDelta::days(29));
    }

    #[test]
    fn until_next_month_respects_offset() {
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 6, 30, 23, 30, 0).unwrap();
        assert_eq!(time_until_next_month(&now), TimeDelta::minutes(30));
    }

    #[test]
    fn fixed_clock_moves_when_told() {
        let start = Local.with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(TimeDelta::minutes(1));
        assert!(in_sweep_window(&clock.now()));

        clock.set(start);
        assert!(!in_sweep_window(&clock.now()));
    }
}

//! Rotation window calculation
//!
//! Daily content is gated by a 24-hour eligibility window anchored to a fixed
//! local reset hour (08:00 by default) in one fixed-offset timezone. Windows
//! are contiguous and non-overlapping: start inclusive, end exclusive. The
//! week (Monday 00:00 local) and month (1st 00:00 local) anchors used by the
//! leaderboard time filters live here too, so the timezone is consumed in
//! exactly one place.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike,
    Utc,
};

use crate::domain::{EngineError, Result};

/// One daily eligibility window, derived from "now" and never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Local calendar date the window started on; seeds the daily selector
    pub local_date: NaiveDate,
}

impl RotationWindow {
    /// Start inclusive, end exclusive. An instant exactly on a boundary
    /// belongs to the window that starts there.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// The instant the next window begins
    pub fn next_reset(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }
}

/// Computes rotation windows and leaderboard time anchors.
///
/// Pure over the supplied instant; holds no locks and touches no storage.
#[derive(Debug, Clone, Copy)]
pub struct RotationClock {
    offset: FixedOffset,
    reset_hour: u32,
    reset_time: NaiveTime,
}

impl RotationClock {
    /// Build a clock for a UTC offset (whole hours) and a local reset hour.
    pub fn new(utc_offset_hours: i32, reset_hour: u32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            EngineError::Validation(format!("invalid UTC offset: {utc_offset_hours}"))
        })?;
        let reset_time = NaiveTime::from_hms_opt(reset_hour, 0, 0)
            .ok_or_else(|| EngineError::Validation(format!("invalid reset hour: {reset_hour}")))?;
        Ok(Self {
            offset,
            reset_hour,
            reset_time,
        })
    }

    /// The window containing `now`.
    ///
    /// If the local hour has passed the reset hour the window started today
    /// at the reset hour, otherwise yesterday at the reset hour; it always
    /// spans exactly 24 hours.
    pub fn window_at(&self, now: DateTime<Utc>) -> RotationWindow {
        let local = now.with_timezone(&self.offset);
        let date = if local.hour() >= self.reset_hour {
            local.date_naive()
        } else {
            local
                .date_naive()
                .checked_sub_days(Days::new(1))
                .unwrap_or_else(|| local.date_naive())
        };
        let start = self.local_to_utc(date.and_time(self.reset_time));
        RotationWindow {
            start,
            end: start + Duration::hours(24),
            local_date: date,
        }
    }

    /// Monday 00:00 local of the week containing `now`, as a UTC instant
    pub fn week_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let date = now.with_timezone(&self.offset).date_naive();
        let monday = date
            .checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
            .unwrap_or(date);
        self.local_to_utc(monday.and_time(NaiveTime::MIN))
    }

    /// The 1st 00:00 local of the month containing `now`, as a UTC instant
    pub fn month_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let date = now.with_timezone(&self.offset).date_naive();
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        self.local_to_utc(first.and_time(NaiveTime::MIN))
    }

    /// A fixed-offset zone has no gaps or overlaps, so local-to-UTC is plain
    /// arithmetic.
    fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - Duration::seconds(self.offset.local_minus_utc() as i64)).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> RotationClock {
        RotationClock::new(7, 8).unwrap()
    }

    /// Local time in UTC+7 expressed as the corresponding UTC instant
    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_before_and_after_reset_are_adjacent_windows() {
        let before = clock().window_at(local(2024, 3, 15, 7, 59));
        let after = clock().window_at(local(2024, 3, 15, 8, 1));

        assert_ne!(before.start, after.start);
        assert_eq!(before.end, after.start);
        assert_eq!(before.local_date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(after.local_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_window_spans_24h_and_next_reset() {
        let w = clock().window_at(local(2024, 3, 15, 12, 0));
        assert_eq!(w.end - w.start, Duration::hours(24));
        assert_eq!(w.next_reset(), w.start + Duration::hours(24));
    }

    #[test]
    fn test_boundary_belongs_to_starting_window() {
        let reset = local(2024, 3, 15, 8, 0);
        let w = clock().window_at(reset);
        // Exactly 08:00 local opens the new window
        assert_eq!(w.start, reset);
        assert!(w.contains(reset));
        assert!(!w.contains(w.end));
        assert!(w.contains(w.end - Duration::milliseconds(1)));
    }

    #[test]
    fn test_windows_are_contiguous_over_a_week() {
        let c = clock();
        let mut t = local(2024, 3, 11, 9, 0);
        for _ in 0..7 {
            let w = c.window_at(t);
            let next = c.window_at(w.end);
            assert_eq!(next.start, w.end);
            t = t + Duration::hours(24);
        }
    }

    #[test]
    fn test_week_starts_monday_midnight_local() {
        // 2024-03-15 is a Friday
        let start = clock().week_start(local(2024, 3, 15, 12, 0));
        assert_eq!(start, local(2024, 3, 11, 0, 0));
        // A Monday is its own week start
        assert_eq!(clock().week_start(local(2024, 3, 11, 0, 0)), local(2024, 3, 11, 0, 0));
    }

    #[test]
    fn test_month_starts_on_the_first_local() {
        let start = clock().month_start(local(2024, 3, 15, 12, 0));
        assert_eq!(start, local(2024, 3, 1, 0, 0));
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(RotationClock::new(99, 8).is_err());
        assert!(RotationClock::new(7, 24).is_err());
    }
}

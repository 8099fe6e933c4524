//! Wall-clock arithmetic in a fixed calendar zone.
//!
//! Hour boundaries, day bounds and calendar dates all depend on the
//! household's local time. The zone is a fixed UTC offset taken from
//! configuration so that layout is deterministic for a given input.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const MINUTE_MS: i64 = 60 * 1000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Convert epoch milliseconds to a UTC timestamp.
///
/// Out-of-range values collapse to the epoch; event timestamps never get near
/// chrono's limits.
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Round a timestamp to the nearest `interval_minutes` boundary of the UTC
/// grid (half rounds up). See [`CalendarZone::round_to_interval`].
pub fn round_to_interval(time: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
    CalendarZone::utc().round_to_interval(time, interval_minutes)
}

/// A fixed-offset calendar used for every wall-clock decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct CalendarZone {
    offset_minutes: i32,
}

impl CalendarZone {
    pub fn utc() -> Self {
        Self { offset_minutes: 0 }
    }

    /// Build a zone from an offset east of UTC. Offsets beyond ±23:59 are
    /// rejected.
    pub fn from_offset_minutes(offset_minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(offset_minutes.checked_mul(60)?)?;
        Some(Self { offset_minutes })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    fn offset_ms(&self) -> i64 {
        i64::from(self.offset_minutes) * MINUTE_MS
    }

    /// A timestamp as local wall-clock time, for display.
    pub fn local(&self, time: DateTime<Utc>) -> DateTime<FixedOffset> {
        time.with_timezone(&self.offset())
    }

    /// Local calendar date of a timestamp.
    pub fn date_of(&self, time: DateTime<Utc>) -> NaiveDate {
        time.with_timezone(&self.offset()).date_naive()
    }

    /// Local wall-clock hour (0-23) of a timestamp.
    pub fn hour_of_day(&self, time: DateTime<Utc>) -> u32 {
        time.with_timezone(&self.offset()).hour()
    }

    /// Start of the local hour containing `time`.
    pub fn floor_hour(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        self.floor_to(time, HOUR_MS)
    }

    /// Start of the local hour following the one containing `time`.
    pub fn next_hour(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        self.floor_hour(time) + Duration::milliseconds(HOUR_MS)
    }

    /// First and last millisecond of the local day containing `time`
    /// (00:00:00.000 to 23:59:59.999).
    pub fn day_bounds(&self, time: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.floor_to(time, DAY_MS);
        (start, start + Duration::milliseconds(DAY_MS - 1))
    }

    /// UTC instant of local midnight starting `date`.
    pub fn midnight_of(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(self.offset_ms())
    }

    /// Hour label in the "8 AM" / "12 PM" style.
    pub fn hour_label(&self, time: DateTime<Utc>) -> String {
        let hours = self.hour_of_day(time);
        let hour12 = match hours % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if hours >= 12 { "PM" } else { "AM" };
        format!("{hour12} {meridiem}")
    }

    /// Round to the nearest `interval_minutes` boundary of the local grid
    /// (half rounds up).
    pub fn round_to_interval(&self, time: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
        let interval = i64::from(interval_minutes.max(1)) * MINUTE_MS;
        let local_ms = time.timestamp_millis() + self.offset_ms();
        from_millis((local_ms + interval / 2).div_euclid(interval) * interval - self.offset_ms())
    }

    fn floor_to(&self, time: DateTime<Utc>, unit_ms: i64) -> DateTime<Utc> {
        let local_ms = time.timestamp_millis() + self.offset_ms();
        from_millis(local_ms.div_euclid(unit_ms) * unit_ms - self.offset_ms())
    }
}

impl Default for CalendarZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl From<i32> for CalendarZone {
    fn from(minutes: i32) -> Self {
        Self::from_offset_minutes(minutes).unwrap_or_default()
    }
}

impl From<CalendarZone> for i32 {
    fn from(zone: CalendarZone) -> Self {
        zone.offset_minutes
    }
}

//! Time ↔ position mapping against rendered hour ticks.
//!
//! While an event is dragged the renderer reports where each hour tick
//! actually landed on screen. The mapper interpolates between those reference
//! points to turn a pointer position into a time (and back), then snaps and
//! clamps the result so a single gesture stays within one calendar day.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::zone::{CalendarZone, HOUR_MS};

/// Scale used when a mapper is built with an unusable one.
pub const DEFAULT_PX_PER_HOUR: f64 = 60.0;

/// Furthest a single conversion may move away from its reference. Results
/// are clamped to one calendar day afterwards, so this never limits a drag.
const MAX_SHIFT_HOURS: f64 = 48.0;

/// A pixels-per-hour scale is usable when finite and positive.
pub fn is_valid_scale(px_per_hour: f64) -> bool {
    px_per_hour.is_finite() && px_per_hour > 0.0
}

/// A rendered hour tick: its timestamp and its vertical pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickPosition {
    pub time: DateTime<Utc>,
    pub y: f64,
}

impl TickPosition {
    pub fn new(time: DateTime<Utc>, y: f64) -> Self {
        Self { time, y }
    }
}

/// Render-surface feedback: where the collaborator actually drew each tick.
pub trait TickPositions {
    fn rendered_tick_positions(&self) -> Vec<TickPosition>;
}

impl TickPositions for [TickPosition] {
    fn rendered_tick_positions(&self) -> Vec<TickPosition> {
        self.to_vec()
    }
}

impl TickPositions for Vec<TickPosition> {
    fn rendered_tick_positions(&self) -> Vec<TickPosition> {
        self.clone()
    }
}

/// How a position was converted to a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimate {
    /// Between two distinct ticks.
    Interpolated,
    /// Beyond the outermost tick, using the pixels-per-hour constant.
    Extrapolated,
    /// From the raw pointer delta; no ticks were rendered.
    Delta,
    /// No information; the original time is kept.
    Unchanged,
}

/// Converts between pixel positions and timestamps.
#[derive(Debug, Clone, Copy)]
pub struct TimeMapper {
    px_per_hour: f64,
    snap_minutes: u32,
    zone: CalendarZone,
}

impl TimeMapper {
    /// A scale that is not finite and positive is replaced by
    /// [`DEFAULT_PX_PER_HOUR`].
    pub fn new(px_per_hour: f64, zone: CalendarZone) -> Self {
        let px_per_hour = if is_valid_scale(px_per_hour) {
            px_per_hour
        } else {
            warn!(px_per_hour, "unusable timeline scale, using default");
            DEFAULT_PX_PER_HOUR
        };
        Self {
            px_per_hour,
            snap_minutes: 5,
            zone,
        }
    }

    pub fn with_snap_minutes(mut self, minutes: u32) -> Self {
        self.snap_minutes = minutes.max(1);
        self
    }

    pub fn px_per_hour(&self) -> f64 {
        self.px_per_hour
    }

    fn hours_to_duration(hours: f64) -> Duration {
        let hours = if hours.is_nan() {
            0.0
        } else {
            hours.clamp(-MAX_SHIFT_HOURS, MAX_SHIFT_HOURS)
        };
        Duration::milliseconds((hours * HOUR_MS as f64).round() as i64)
    }

    /// `time` moved by `hours`, or `time` itself if that leaves chrono's range.
    fn shift(time: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
        time.checked_add_signed(Self::hours_to_duration(hours)).unwrap_or(time)
    }

    /// Raw (unsnapped) time at pixel `y`.
    ///
    /// Uses the closest tick at or above and at or below `y`. With both on
    /// distinct positions the time is interpolated linearly; with only one the
    /// result is extrapolated at the configured scale; with none `fallback` is
    /// returned unchanged.
    pub fn time_at(
        &self,
        ticks: &[TickPosition],
        y: f64,
        fallback: DateTime<Utc>,
    ) -> (DateTime<Utc>, Estimate) {
        let mut above: Option<TickPosition> = None;
        let mut below: Option<TickPosition> = None;
        for tick in ticks {
            if tick.y <= y && above.map_or(true, |a| tick.y > a.y) {
                above = Some(*tick);
            }
            if tick.y >= y && below.map_or(true, |b| tick.y < b.y) {
                below = Some(*tick);
            }
        }

        match (above, below) {
            (Some(a), Some(b)) if a.y != b.y => {
                let fraction = (y - a.y) / (b.y - a.y);
                let span = (b.time - a.time).num_milliseconds() as f64;
                let offset = Duration::milliseconds((fraction * span).round() as i64);
                (a.time.checked_add_signed(offset).unwrap_or(a.time), Estimate::Interpolated)
            }
            (Some(a), _) => {
                let hours = (y - a.y) / self.px_per_hour;
                (Self::shift(a.time, hours), Estimate::Extrapolated)
            }
            (None, Some(b)) => {
                let hours = (b.y - y) / self.px_per_hour;
                (Self::shift(b.time, -hours), Estimate::Extrapolated)
            }
            (None, None) => (fallback, Estimate::Unchanged),
        }
    }

    /// Raw time from a pointer delta when no ticks are available.
    pub fn time_from_delta(&self, original: DateTime<Utc>, delta_y: f64) -> DateTime<Utc> {
        Self::shift(original, delta_y / self.px_per_hour)
    }

    /// Pixel position of `time`, inverse of [`Self::time_at`].
    ///
    /// Returns `None` when no ticks are rendered.
    pub fn position_of(&self, ticks: &[TickPosition], time: DateTime<Utc>) -> Option<f64> {
        let mut before: Option<TickPosition> = None;
        let mut after: Option<TickPosition> = None;
        for tick in ticks {
            if tick.time <= time && before.map_or(true, |b| tick.time > b.time) {
                before = Some(*tick);
            }
            if tick.time >= time && after.map_or(true, |a| tick.time < a.time) {
                after = Some(*tick);
            }
        }

        let hours_from = |t: DateTime<Utc>| (time - t).num_milliseconds() as f64 / HOUR_MS as f64;
        match (before, after) {
            (Some(b), Some(a)) if b.time != a.time => {
                let fraction = (time - b.time).num_milliseconds() as f64
                    / (a.time - b.time).num_milliseconds() as f64;
                Some(b.y + fraction * (a.y - b.y))
            }
            (Some(b), _) => Some(b.y + hours_from(b.time) * self.px_per_hour),
            (None, Some(a)) => Some(a.y + hours_from(a.time) * self.px_per_hour),
            (None, None) => None,
        }
    }

    /// Snap to the interval grid, then clamp into the calendar day containing
    /// `original`.
    pub fn settle(&self, raw: DateTime<Utc>, original: DateTime<Utc>) -> DateTime<Utc> {
        let snapped = self.zone.round_to_interval(raw, self.snap_minutes);
        let (day_start, day_end) = self.zone.day_bounds(original);
        snapped.clamp(day_start, day_end)
    }

    /// Full position → time conversion: raw estimate, snap, clamp.
    pub fn resolve(
        &self,
        ticks: &[TickPosition],
        y: f64,
        original: DateTime<Utc>,
    ) -> (DateTime<Utc>, Estimate) {
        let (raw, estimate) = self.time_at(ticks, y, original);
        (self.settle(raw, original), estimate)
    }

    /// Delta-based conversion: raw estimate, snap, clamp.
    pub fn resolve_delta(&self, original: DateTime<Utc>, delta_y: f64) -> DateTime<Utc> {
        self.settle(self.time_from_delta(original, delta_y), original)
    }
}

//! Empty-hour runs between consecutive events.
//!
//! When the flattener moves from one event to the next it must account for
//! every whole-hour boundary in between. This module enumerates those
//! boundaries and summarizes a run of them as a collapsed gap.

use chrono::{DateTime, Duration, Utc};

use super::zone::{CalendarZone, HOUR_MS};

/// Whole-hour boundaries strictly after `last_rendered` up to and including
/// `target_hour`. Empty when both fall in the same hour.
pub fn hours_between(last_rendered: DateTime<Utc>, target_hour: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let step = Duration::milliseconds(HOUR_MS);
    let mut hours = Vec::new();
    let mut h = last_rendered + step;
    while h <= target_hour {
        hours.push(h);
        h += step;
    }
    hours
}

/// A run of two or more hour boundaries collapsed into `first`, a gap marker
/// and `last`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourRun {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    /// Boundaries hidden by the gap marker.
    pub hidden: u32,
    /// Interior midnight (not `first`, not `last`) inside the run, if any.
    pub midnight: Option<DateTime<Utc>>,
}

impl HourRun {
    /// Summarize a boundary list. Returns `None` for fewer than two boundaries.
    pub fn from_hours(hours: &[DateTime<Utc>], zone: CalendarZone) -> Option<Self> {
        if hours.len() < 2 {
            return None;
        }
        let first = *hours.first()?;
        let last = *hours.last()?;
        let interior = &hours[1..hours.len() - 1];
        let midnight = interior
            .iter()
            .copied()
            .find(|h| zone.hour_of_day(*h) == 0);
        Some(Self {
            first,
            last,
            hidden: (hours.len() - 1) as u32,
            midnight,
        })
    }

    /// Position of `now` within the run, when the run owns it.
    ///
    /// The run claims `now` from `first` until `owns_until` (the next event's
    /// start) so the marker stays pinned to the bottom of the gap instead of
    /// jumping past the closing tick. Progress is clamped to 1.0.
    pub fn now_progress(&self, now: DateTime<Utc>, owns_until: DateTime<Utc>) -> Option<f64> {
        if now < self.first || now >= owns_until {
            return None;
        }
        let span = (self.last - self.first).num_milliseconds();
        if span <= 0 {
            return Some(1.0);
        }
        let raw = (now - self.first).num_milliseconds() as f64 / span as f64;
        Some(raw.min(1.0))
    }
}

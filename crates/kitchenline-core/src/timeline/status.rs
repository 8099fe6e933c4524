//! Live status derivation.
//!
//! An event's status is a function of its timing and the current time. The
//! only exception is `Done`, which is set by the user and never recomputed.

use chrono::{DateTime, Duration, Utc};

use crate::schedule::{EventStatus, KitchenEvent};

/// Default lead time before an event's start during which it counts as `Soon`.
pub const SOON_WINDOW_MINUTES: i64 = 30;

/// Derives [`EventStatus`] from wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct StatusEngine {
    soon_window: Duration,
}

impl StatusEngine {
    pub fn new() -> Self {
        Self {
            soon_window: Duration::minutes(SOON_WINDOW_MINUTES),
        }
    }

    pub fn with_soon_window(mut self, minutes: i64) -> Self {
        self.soon_window = Duration::minutes(minutes.max(0));
        self
    }

    /// Status of `event` at `now`.
    ///
    /// Precedence: `Done` (sticky), then `Active` when `now` lies in
    /// `[start, end]` inclusive, then `Overdue` once the start has passed,
    /// then `Soon` inside the lead window, otherwise `Upcoming`.
    pub fn status(&self, event: &KitchenEvent, now: DateTime<Utc>) -> EventStatus {
        if event.status == EventStatus::Done {
            return EventStatus::Done;
        }

        let start = event.start_time;
        if now >= start && now <= event.effective_end() {
            return EventStatus::Active;
        }

        if now > start {
            return EventStatus::Overdue;
        }

        let until = start - now;
        if until > Duration::zero() && until <= self.soon_window {
            return EventStatus::Soon;
        }

        EventStatus::Upcoming
    }
}

impl Default for StatusEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Status with the default 30 minute lead window.
pub fn status(event: &KitchenEvent, now: DateTime<Utc>) -> EventStatus {
    StatusEngine::new().status(event, now)
}

//! Injectable wall-clock source.
//!
//! Status and layout take `now` as a parameter; callers obtain it from a
//! [`Clock`] so tests and debugging sessions can pin time deterministically.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System time unless an override is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugClock {
    override_time: Option<DateTime<Utc>>,
}

impl DebugClock {
    pub fn new(override_time: Option<DateTime<Utc>>) -> Self {
        Self { override_time }
    }

    /// Pin the clock to `time`.
    pub fn fixed(time: DateTime<Utc>) -> Self {
        Self::new(Some(time))
    }

    pub fn set(&mut self, time: Option<DateTime<Utc>>) {
        self.override_time = time;
    }

    pub fn is_overridden(&self) -> bool {
        self.override_time.is_some()
    }
}

impl Clock for DebugClock {
    fn now(&self) -> DateTime<Utc> {
        self.override_time.unwrap_or_else(Utc::now)
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

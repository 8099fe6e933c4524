//! Kitchen event types.
//!
//! A [`KitchenEvent`] is the atomic schedulable unit placed on the timeline:
//! a meal, a cooking session, a grocery run, a dishwasher cycle. Events are
//! created and mutated by the event store; the engine only reads them, except
//! when a drag commits a new start time.

mod actions;

pub use actions::{add_event_at, toggle_confirm, toggle_pinned, undo_done};

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timeline::CalendarZone;

/// Opaque event identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh `event_<uuid>` identifier.
    pub fn generate() -> Self {
        Self(format!("event_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Household member identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PersonId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What kind of kitchen activity an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Cooking,
    Eating,
    Defrost,
    Grocery,
    Dishwasher,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cooking => "cooking",
            Self::Eating => "eating",
            Self::Defrost => "defrost",
            Self::Grocery => "grocery",
            Self::Dishwasher => "dishwasher",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cooking => "Cook",
            Self::Eating => "Eat",
            Self::Defrost => "Defrost",
            Self::Grocery => "Grocery",
            Self::Dishwasher => "Dishes",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cooking" => Ok(Self::Cooking),
            "eating" => Ok(Self::Eating),
            "defrost" => Ok(Self::Defrost),
            "grocery" => Ok(Self::Grocery),
            "dishwasher" => Ok(Self::Dishwasher),
            other => Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("unknown event kind '{other}'"),
            }),
        }
    }
}

/// Live status of an event.
///
/// Only `Done` is meaningful as a persisted value; every other status is
/// derived from the clock by [`crate::timeline::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Soon,
    Active,
    Overdue,
    Done,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Soon => "soon",
            Self::Active => "active",
            Self::Overdue => "overdue",
            Self::Done => "done",
        }
    }
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::Upcoming
    }
}

/// A scheduled kitchen activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Local calendar date of `start_time`.
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    /// `None` for point-in-time events.
    pub end_time: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub participants: BTreeSet<PersonId>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub confirmed: bool,
}

impl KitchenEvent {
    /// Create a point-in-time event.
    pub fn new(
        id: impl Into<EventId>,
        kind: EventKind,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        zone: CalendarZone,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            date: zone.date_of(start_time),
            start_time,
            end_time: None,
            title: title.into(),
            description: None,
            participants: BTreeSet::new(),
            status: EventStatus::Upcoming,
            pinned: false,
            confirmed: false,
        }
    }

    /// Create an event spanning `[start_time, end_time]`.
    ///
    /// # Errors
    /// Returns an error if `end_time <= start_time`
    pub fn try_new(
        id: impl Into<EventId>,
        kind: EventKind,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        zone: CalendarZone,
    ) -> Result<Self, ValidationError> {
        if end_time <= start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }
        let mut event = Self::new(id, kind, title, start_time, zone);
        event.end_time = Some(end_time);
        Ok(event)
    }

    /// Check the `end_time > start_time` invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.end_time {
            Some(end) if end <= self.start_time => Err(ValidationError::InvalidTimeRange {
                start: self.start_time,
                end,
            }),
            _ => Ok(()),
        }
    }

    /// End of the occupied range; point events end where they start.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    /// Zero for point events.
    pub fn duration(&self) -> Duration {
        self.effective_end() - self.start_time
    }

    pub fn has_participant(&self, person: &PersonId) -> bool {
        self.participants.contains(person)
    }

    pub fn shares_participant(&self, participants: &BTreeSet<PersonId>) -> bool {
        self.participants.iter().any(|p| participants.contains(p))
    }

    /// Move the event to `new_start`, preserving its duration and recomputing
    /// the calendar date.
    pub fn move_to(&mut self, new_start: DateTime<Utc>, zone: CalendarZone) {
        let duration = self.duration();
        self.start_time = new_start;
        self.end_time = self.end_time.map(|_| new_start + duration);
        self.date = zone.date_of(new_start);
    }

    pub fn with_participant(mut self, person: impl Into<PersonId>) -> Self {
        self.participants.insert(person.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn try_new_rejects_inverted_range() {
        let zone = CalendarZone::utc();
        let err = KitchenEvent::try_new("e", EventKind::Eating, "Lunch", at(12, 0), at(12, 0), zone)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn event_kind_parses_case_insensitively() {
        assert_eq!("Grocery".parse::<EventKind>().unwrap(), EventKind::Grocery);
        assert_eq!("dishwasher".parse::<EventKind>().unwrap(), EventKind::Dishwasher);
        assert!("brunch".parse::<EventKind>().is_err());
    }

    #[test]
    fn move_preserves_duration_and_updates_date() {
        let zone = CalendarZone::from_offset_minutes(60).unwrap();
        let mut event =
            KitchenEvent::try_new("e", EventKind::Cooking, "Roast", at(18, 0), at(19, 30), zone)
                .unwrap();
        event.move_to(at(22, 45), zone);
        assert_eq!(event.start_time, at(22, 45));
        assert_eq!(event.end_time, Some(at(22, 45) + Duration::minutes(90)));
        // 22:45 UTC is already the next day at +01:00.
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn move_keeps_point_events_pointlike() {
        let zone = CalendarZone::utc();
        let mut event = KitchenEvent::new("e", EventKind::Defrost, "Chicken", at(8, 0), zone);
        event.move_to(at(9, 0), zone);
        assert_eq!(event.end_time, None);
        assert_eq!(event.duration(), Duration::zero());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let event = KitchenEvent::new("e1", EventKind::Grocery, "Shop", at(10, 0), CalendarZone::utc())
            .with_participant("person_alex");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "grocery");
        assert_eq!(json["date"], "2026-03-14");
        assert!(json.get("startTime").is_some());
        assert_eq!(json["participants"][0], "person_alex");
        let decoded: KitchenEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = EventId::generate();
        let b = EventId::generate();
        assert!(a.as_str().starts_with("event_"));
        assert_ne!(a, b);
    }
}

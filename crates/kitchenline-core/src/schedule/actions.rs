//! User actions on individual events, expressed over the store contract.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{EventId, EventKind, EventStatus, KitchenEvent};
use crate::error::{CoreError, ValidationError};
use crate::storage::EventStore;
use crate::timeline::CalendarZone;

/// Flip an event's `confirmed` flag.
///
/// Confirming an event that has already started (start at or before `now`)
/// also marks it done. Returns the new flag, or `None` if the event is
/// unknown.
pub fn toggle_confirm<S: EventStore + ?Sized>(
    store: &mut S,
    id: &EventId,
    now: DateTime<Utc>,
) -> Option<bool> {
    let event = store.get(id)?;
    let confirmed = !event.confirmed;
    store.set_confirmed(id, confirmed);
    if confirmed && event.start_time <= now && event.status != EventStatus::Done {
        store.mark_done(id);
        debug!(event = %id, "confirmed past event marked done");
    }
    Some(confirmed)
}

/// Flip an event's `pinned` flag. Returns the new flag.
pub fn toggle_pinned<S: EventStore + ?Sized>(store: &mut S, id: &EventId) -> Option<bool> {
    let pinned = !store.get(id)?.pinned;
    store.set_pinned(id, pinned);
    Some(pinned)
}

/// Revert a done event. Returns `false` if the event is unknown.
pub fn undo_done<S: EventStore + ?Sized>(store: &mut S, id: &EventId) -> bool {
    store.undo_done(id)
}

/// Insert a fresh event at `start` and return its generated id.
///
/// # Errors
/// Returns an error if `duration` is zero or negative, or the store rejects
/// the event.
pub fn add_event_at<S: EventStore + ?Sized>(
    store: &mut S,
    start: DateTime<Utc>,
    kind: EventKind,
    title: impl Into<String>,
    duration: Option<Duration>,
    zone: CalendarZone,
) -> Result<EventId, CoreError> {
    let id = EventId::generate();
    let event = match duration {
        Some(d) if d <= Duration::zero() => {
            return Err(ValidationError::InvalidValue {
                field: "duration".to_string(),
                message: "must be positive".to_string(),
            }
            .into())
        }
        Some(d) => KitchenEvent::try_new(id.clone(), kind, title, start, start + d, zone)?,
        None => KitchenEvent::new(id.clone(), kind, title, start, zone),
    };
    store.insert(event)?;
    debug!(event = %id, start = %start, "event added");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EventSource, MemoryEventStore};
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, 0, 0).unwrap()
    }

    fn store() -> MemoryEventStore {
        let zone = CalendarZone::utc();
        MemoryEventStore::with_events(
            zone,
            vec![
                KitchenEvent::new("lunch", EventKind::Eating, "Lunch", at(12), zone),
                KitchenEvent::new("dinner", EventKind::Eating, "Dinner", at(19), zone),
            ],
        )
    }

    #[test]
    fn confirming_a_started_event_marks_it_done() {
        let mut store = store();
        let id: EventId = "lunch".into();
        assert_eq!(toggle_confirm(&mut store, &id, at(13)), Some(true));
        let lunch = store.get(&id).unwrap();
        assert!(lunch.confirmed);
        assert_eq!(lunch.status, EventStatus::Done);
    }

    #[test]
    fn confirming_a_future_event_keeps_status() {
        let mut store = store();
        let id: EventId = "dinner".into();
        toggle_confirm(&mut store, &id, at(13));
        assert_eq!(store.get(&id).unwrap().status, EventStatus::Upcoming);
        assert_eq!(toggle_confirm(&mut store, &id, at(13)), Some(false));
        assert!(!store.get(&id).unwrap().confirmed);
    }

    #[test]
    fn unconfirming_does_not_undo_done() {
        let mut store = store();
        let id: EventId = "lunch".into();
        toggle_confirm(&mut store, &id, at(13));
        toggle_confirm(&mut store, &id, at(13));
        let lunch = store.get(&id).unwrap();
        assert!(!lunch.confirmed);
        assert_eq!(lunch.status, EventStatus::Done);
    }

    #[test]
    fn undo_after_confirm_pins() {
        let mut store = store();
        let id: EventId = "lunch".into();
        toggle_confirm(&mut store, &id, at(13));
        assert!(undo_done(&mut store, &id));
        let lunch = store.get(&id).unwrap();
        assert_eq!(lunch.status, EventStatus::Upcoming);
        assert!(lunch.pinned);
        assert!(!lunch.confirmed);
    }

    #[test]
    fn toggles_on_unknown_ids_are_none() {
        let mut store = store();
        assert_eq!(toggle_confirm(&mut store, &"nope".into(), at(13)), None);
        assert_eq!(toggle_pinned(&mut store, &"nope".into()), None);
    }

    #[test]
    fn add_event_keeps_order() {
        let mut store = store();
        let zone = store.zone();
        let id = add_event_at(&mut store, at(15), EventKind::Grocery, "Shop", Some(Duration::minutes(45)), zone)
            .unwrap();
        assert!(id.as_str().starts_with("event_"));
        let ids: Vec<String> = store.snapshot().iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["lunch".to_string(), id.to_string(), "dinner".to_string()]);
        assert_eq!(store.get(&id).unwrap().duration(), Duration::minutes(45));
    }

    #[test]
    fn add_event_rejects_empty_duration() {
        let mut store = store();
        let zone = store.zone();
        let err = add_event_at(&mut store, at(15), EventKind::Grocery, "Shop", Some(Duration::zero()), zone);
        assert!(matches!(err, Err(CoreError::Validation(_))));
        assert_eq!(store.len(), 2);
    }
}

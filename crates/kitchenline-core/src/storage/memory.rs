//! In-memory event store with copy-on-write snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{EventMutation, EventSource};
use crate::error::StoreError;
use crate::schedule::{EventId, EventStatus, KitchenEvent};
use crate::timeline::CalendarZone;

/// Holds events as an `Arc<[KitchenEvent]>` that is replaced, never edited,
/// on every mutation.
#[derive(Debug, Clone)]
pub struct MemoryEventStore {
    events: Arc<[KitchenEvent]>,
    zone: CalendarZone,
    revision: u64,
}

impl MemoryEventStore {
    pub fn new(zone: CalendarZone) -> Self {
        Self {
            events: Arc::from(Vec::new()),
            zone,
            revision: 0,
        }
    }

    /// Build a store from already-validated events, sorted by start time.
    pub fn with_events(zone: CalendarZone, mut events: Vec<KitchenEvent>) -> Self {
        events.sort_by_key(|e| e.start_time);
        Self {
            events: Arc::from(events),
            zone,
            revision: 0,
        }
    }

    /// Incremented on every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn publish(&mut self, events: Vec<KitchenEvent>) {
        self.events = Arc::from(events);
        self.revision += 1;
    }

    /// Apply `f` to a copy of the event and publish a new snapshot.
    fn update(&mut self, id: &EventId, f: impl FnOnce(&mut KitchenEvent)) -> bool {
        let Some(index) = self.events.iter().position(|e| &e.id == id) else {
            return false;
        };
        let mut next = self.events.to_vec();
        f(&mut next[index]);
        self.publish(next);
        true
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new(CalendarZone::utc())
    }
}

impl EventSource for MemoryEventStore {
    fn snapshot(&self) -> Arc<[KitchenEvent]> {
        Arc::clone(&self.events)
    }
}

impl EventMutation for MemoryEventStore {
    fn reschedule(&mut self, id: &EventId, new_start: DateTime<Utc>) -> bool {
        let zone = self.zone;
        let mut next = self.events.to_vec();
        let Some(index) = next.iter().position(|e| &e.id == id) else {
            return false;
        };
        next[index].move_to(new_start, zone);
        next.sort_by_key(|e| e.start_time);
        debug!(event = %id, start = %new_start, "event rescheduled");
        self.publish(next);
        true
    }

    fn mark_done(&mut self, id: &EventId) -> bool {
        self.update(id, |e| e.status = EventStatus::Done)
    }

    fn undo_done(&mut self, id: &EventId) -> bool {
        self.update(id, |e| {
            e.status = EventStatus::Upcoming;
            e.confirmed = false;
            e.pinned = true;
        })
    }

    fn set_pinned(&mut self, id: &EventId, pinned: bool) -> bool {
        self.update(id, |e| e.pinned = pinned)
    }

    fn set_confirmed(&mut self, id: &EventId, confirmed: bool) -> bool {
        self.update(id, |e| e.confirmed = confirmed)
    }

    fn insert(&mut self, event: KitchenEvent) -> Result<(), StoreError> {
        if self.events.iter().any(|e| e.id == event.id) {
            return Err(StoreError::DuplicateId(event.id.to_string()));
        }
        let mut next = self.events.to_vec();
        next.push(event);
        next.sort_by_key(|e| e.start_time);
        self.publish(next);
        Ok(())
    }

    fn remove(&mut self, id: &EventId) -> Option<KitchenEvent> {
        let index = self.events.iter().position(|e| &e.id == id)?;
        let mut next = self.events.to_vec();
        let removed = next.remove(index);
        self.publish(next);
        Some(removed)
    }
}

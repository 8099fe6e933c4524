//! Event storage contract and implementations.
//!
//! The engine reads events through [`EventSource`] and writes them back
//! through [`EventMutation`]. Each mutation publishes a fresh immutable
//! snapshot, so a layout pass never observes a half-applied change.

mod config;
mod file;
mod memory;
mod records;

pub use config::{Config, DragConfig, LayoutConfig, TimelineConfig};
pub use file::JsonFileStore;
pub use memory::MemoryEventStore;
pub use records::decode_records;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{ConfigError, StoreError};
use crate::schedule::{EventId, KitchenEvent};

/// Read side of the event store.
pub trait EventSource {
    /// The current immutable list of events.
    fn snapshot(&self) -> Arc<[KitchenEvent]>;

    /// Events whose start lies in `[from, to)`, sorted by start time.
    fn events_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<KitchenEvent> {
        let mut events: Vec<KitchenEvent> = self
            .snapshot()
            .iter()
            .filter(|e| e.start_time >= from && e.start_time < to)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_time);
        events
    }

    fn get(&self, id: &EventId) -> Option<KitchenEvent> {
        self.snapshot().iter().find(|e| &e.id == id).cloned()
    }
}

/// Write side of the event store.
///
/// Every operation is idempotent and last-write-wins. The boolean result
/// reports whether the event exists, not whether anything changed.
pub trait EventMutation {
    /// Move an event to `new_start`, preserving its duration and recomputing
    /// its calendar date.
    fn reschedule(&mut self, id: &EventId, new_start: DateTime<Utc>) -> bool;

    fn mark_done(&mut self, id: &EventId) -> bool;

    /// Revert a done event: status back to upcoming, unconfirmed, and pinned
    /// so it is not swapped out while already in the past.
    fn undo_done(&mut self, id: &EventId) -> bool;

    fn set_pinned(&mut self, id: &EventId, pinned: bool) -> bool;

    fn set_confirmed(&mut self, id: &EventId, confirmed: bool) -> bool;

    /// Add a new event.
    ///
    /// # Errors
    /// Returns an error if an event with the same id exists.
    fn insert(&mut self, event: KitchenEvent) -> Result<(), StoreError>;

    fn remove(&mut self, id: &EventId) -> Option<KitchenEvent>;
}

/// A full read/write store.
pub trait EventStore: EventSource + EventMutation {}

impl<T: EventSource + EventMutation> EventStore for T {}

/// Returns `~/.config/kitchenline[-dev]/` based on KITCHENLINE_ENV.
///
/// Set KITCHENLINE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("KITCHENLINE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("kitchenline-dev")
    } else {
        base_dir.join("kitchenline")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

//! JSON file-backed event store.
//!
//! The whole list is read on open and written back by [`JsonFileStore::save`].
//! Mutations go through the in-memory snapshot store in between.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::records::decode_records;
use super::{data_dir, EventMutation, EventSource, MemoryEventStore};
use crate::error::{CoreError, StoreError};
use crate::schedule::{EventId, KitchenEvent};
use crate::timeline::CalendarZone;

/// Events persisted as a JSON array at `path`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryEventStore,
    saved_revision: u64,
}

impl JsonFileStore {
    /// Default location of the event file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn default_path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("events.json"))
    }

    /// Open the store at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, is not valid
    /// JSON, or is not an array.
    pub fn open(path: impl AsRef<Path>, zone: CalendarZone) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let events = match std::fs::read_to_string(&path) {
            Ok(content) => decode_records(serde_json::from_str(&content)?)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::ReadFailed { path, source }.into()),
        };
        debug!(path = %path.display(), count = events.len(), "event file loaded");
        Ok(Self {
            path,
            inner: MemoryEventStore::with_events(zone, events),
            saved_revision: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are mutations not yet written.
    pub fn is_dirty(&self) -> bool {
        self.inner.revision() != self.saved_revision
    }

    /// Write the current snapshot back as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&mut self) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(&*self.inner.snapshot())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        })?;
        self.saved_revision = self.inner.revision();
        Ok(())
    }
}

impl EventSource for JsonFileStore {
    fn snapshot(&self) -> Arc<[KitchenEvent]> {
        self.inner.snapshot()
    }
}

impl EventMutation for JsonFileStore {
    fn reschedule(&mut self, id: &EventId, new_start: DateTime<Utc>) -> bool {
        self.inner.reschedule(id, new_start)
    }

    fn mark_done(&mut self, id: &EventId) -> bool {
        self.inner.mark_done(id)
    }

    fn undo_done(&mut self, id: &EventId) -> bool {
        self.inner.undo_done(id)
    }

    fn set_pinned(&mut self, id: &EventId, pinned: bool) -> bool {
        self.inner.set_pinned(id, pinned)
    }

    fn set_confirmed(&mut self, id: &EventId, confirmed: bool) -> bool {
        self.inner.set_confirmed(id, confirmed)
    }

    fn insert(&mut self, event: KitchenEvent) -> Result<(), StoreError> {
        self.inner.insert(event)
    }

    fn remove(&mut self, id: &EventId) -> Option<KitchenEvent> {
        self.inner.remove(id)
    }
}

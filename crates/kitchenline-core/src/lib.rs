//! # Kitchenline Core Library
//!
//! This library provides the temporal layout and rescheduling engine for the
//! kitchen timeline: meals, cooking sessions, grocery runs and dishwasher
//! cycles laid out on one vertical, multi-day timeline that the user can
//! drag events along.
//!
//! ## Architecture
//!
//! - **Timeline**: live status derivation, participant conflict detection,
//!   flattening of sparse events into render items, and time↔position mapping
//!   against rendered hour ticks
//! - **Drag**: a caller-ticked preparing/dragging/settling state machine that
//!   turns pointer moves into snapped, conflict-checked reschedules
//! - **Storage**: the event store contract with snapshot-based in-memory and
//!   JSON file implementations, plus TOML configuration
//!
//! ## Key Components
//!
//! - [`Flattener`]: builds the render sequence for one layout pass
//! - [`TimeMapper`]: converts pointer positions into times
//! - [`DragController`]: drag session state machine
//! - [`EventStore`]: read/write contract with the event store
//! - [`Config`]: engine configuration management

pub mod clock;
pub mod drag;
pub mod error;
pub mod events;
pub mod schedule;
pub mod storage;
pub mod timeline;

pub use clock::{Clock, DebugClock, SystemClock};
pub use drag::{DragController, DragPhase, DragSession, Frame, LongPress, PointerSample, SessionId};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{DiscardReason, DragEvent};
pub use schedule::{EventId, EventKind, EventStatus, KitchenEvent, PersonId};
pub use storage::{Config, EventMutation, EventSource, EventStore, JsonFileStore, MemoryEventStore};
pub use timeline::{
    CalendarZone, Flattener, LayoutMode, PersonFilter, RenderItem, StatusEngine, SyntheticSurface, TickPosition,
    TickPositions, TimeMapper,
};

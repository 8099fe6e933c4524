//! Temporal layout of the kitchen timeline.
//!
//! This module provides:
//! - Live status derivation from wall-clock time
//! - Participant-scoped conflict detection
//! - Flattening of sparse multi-day events into render items
//! - Mapping between rendered tick positions and timestamps

mod conflict;
mod flatten;
mod gap;
mod item;
mod mapper;
mod status;
mod surface;
mod zone;

pub use conflict::{find_conflict, is_blocked, times_overlap};
pub use flatten::{events_by_date, flatten, now_marker_count, Flattener, PersonFilter};
pub use gap::{hours_between, HourRun};
pub use item::{LayoutMode, LayoutScale, RenderItem};
pub use mapper::{is_valid_scale, Estimate, TickPosition, TickPositions, TimeMapper, DEFAULT_PX_PER_HOUR};
pub use status::{status, StatusEngine, SOON_WINDOW_MINUTES};
pub use surface::{EventPosition, SyntheticSurface};
pub use zone::{from_millis, round_to_interval, CalendarZone, DAY_MS, HOUR_MS, MINUTE_MS};

//! Drag-to-reschedule interaction.
//!
//! - [`DragController`]: the preparing/dragging/settling state machine
//! - [`ScrollAnchor`]: keeps the dragged card still while the scale animates
//! - [`LongPress`]: hold-to-undo timer for done events

mod anchor;
mod controller;
mod long_press;
mod session;

pub use anchor::{Frame, ScrollAnchor};
pub use controller::DragController;
pub use long_press::{LongPress, LONG_PRESS_MS};
pub use session::{DragPhase, DragSession, PointerSample, SessionId};

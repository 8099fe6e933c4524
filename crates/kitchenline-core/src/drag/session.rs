use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::EventId;

/// Identity of one drag session. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drag#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    /// Layout expanding; pointer positions are unstable.
    Preparing,
    Dragging,
    /// Layout collapsing after drop or cancel.
    Settling,
}

impl DragPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DragPhase::Preparing => "preparing",
            DragPhase::Dragging => "dragging",
            DragPhase::Settling => "settling",
        }
    }
}

/// One pointer-move report from the gesture layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerSample {
    /// Top of the dragged overlay where it is actually drawn.
    #[serde(default)]
    pub overlay_top: Option<f64>,
    /// Top of the card when the gesture began.
    #[serde(default)]
    pub initial_top: Option<f64>,
    /// Pointer travel since the gesture began.
    #[serde(default)]
    pub delta_y: f64,
}

impl PointerSample {
    pub fn new(overlay_top: Option<f64>, initial_top: Option<f64>, delta_y: f64) -> Self {
        Self {
            overlay_top,
            initial_top,
            delta_y,
        }
    }

    /// A sample where only the raw delta is known.
    pub fn from_delta(delta_y: f64) -> Self {
        Self {
            delta_y,
            ..Self::default()
        }
    }

    /// Y of the card's timeline dot: the drawn overlay top, or the initial
    /// top plus delta, shifted by `dot_offset`.
    pub fn dot_y(&self, dot_offset: f64) -> Option<f64> {
        self.overlay_top
            .or_else(|| self.initial_top.map(|top| top + self.delta_y))
            .map(|top| top + dot_offset)
    }
}

/// The single active drag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragSession {
    pub id: SessionId,
    pub event_id: EventId,
    pub original_time: DateTime<Utc>,
    pub preview_time: DateTime<Utc>,
    pub blocked: bool,
    pub phase: DragPhase,
    /// Monotonic ms at which the current phase began.
    pub phase_started_ms: u64,
    /// Last sample received while preparing.
    pub pending: Option<PointerSample>,
}

impl DragSession {
    pub(crate) fn new(id: SessionId, event_id: EventId, original_time: DateTime<Utc>, at_ms: u64) -> Self {
        Self {
            id,
            event_id,
            original_time,
            preview_time: original_time,
            blocked: false,
            phase: DragPhase::Preparing,
            phase_started_ms: at_ms,
            pending: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != DragPhase::Settling
    }

    pub fn moved(&self) -> bool {
        self.preview_time != self.original_time
    }

    pub(crate) fn elapsed(&self, at_ms: u64) -> u64 {
        at_ms.saturating_sub(self.phase_started_ms)
    }

    pub(crate) fn enter(&mut self, phase: DragPhase, at_ms: u64) {
        self.phase = phase;
        self.phase_started_ms = at_ms;
    }

    /// Drop preview state, as on release or cancel.
    pub(crate) fn clear_preview(&mut self) {
        self.preview_time = self.original_time;
        self.blocked = false;
        self.pending = None;
    }
}

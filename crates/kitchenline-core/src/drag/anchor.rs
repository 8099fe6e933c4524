//! Scroll anchoring while the timeline scale animates.
//!
//! When the layout expands or collapses the dragged card moves on screen.
//! Each animation frame the host reports the card's current top and scrolls
//! by the returned correction, keeping the card where it was when the phase
//! began.

use serde::Serialize;

use super::session::SessionId;

/// What the host's frame loop should do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    /// Pixels to add to the scroll offset, if any.
    pub scroll_by: Option<f64>,
    /// `false` once the loop must stop scheduling frames.
    pub keep_running: bool,
}

impl Frame {
    pub const STOP: Frame = Frame {
        scroll_by: None,
        keep_running: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnchor {
    session: SessionId,
    /// Card top when the phase began; `None` if the card was not on screen.
    initial_y: Option<f64>,
    started_ms: u64,
    duration_ms: u64,
    epsilon: f64,
}

impl ScrollAnchor {
    pub fn new(session: SessionId, initial_y: Option<f64>, started_ms: u64, duration_ms: u64, epsilon: f64) -> Self {
        Self {
            session,
            initial_y,
            started_ms,
            duration_ms,
            epsilon,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_expired(&self, at_ms: u64) -> bool {
        at_ms.saturating_sub(self.started_ms) >= self.duration_ms
    }

    /// Correction for one frame. Corrections within `epsilon` are dropped.
    pub fn frame(&self, current_y: Option<f64>, at_ms: u64) -> Frame {
        let scroll_by = match (self.initial_y, current_y) {
            (Some(initial), Some(current)) if (current - initial).abs() > self.epsilon => Some(current - initial),
            _ => None,
        };
        Frame {
            scroll_by,
            keep_running: !self.is_expired(at_ms),
        }
    }
}

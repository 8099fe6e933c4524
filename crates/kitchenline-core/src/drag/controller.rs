//! Drag session controller.
//!
//! A tagged state machine owning at most one [`DragSession`]:
//!
//! ```text
//! idle -> preparing -> dragging -> settling -> idle
//!             \______________________/
//!                 release / cancel
//! ```
//!
//! It has no internal timers. The caller passes a monotonic millisecond
//! timestamp with every input and calls [`DragController::tick`] from its
//! ticker so phase windows can elapse. Every transition returns the
//! [`DragEvent`] describing it.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::anchor::{Frame, ScrollAnchor};
use super::session::{DragPhase, DragSession, PointerSample, SessionId};
use crate::events::{DiscardReason, DragEvent};
use crate::schedule::{EventId, KitchenEvent};
use crate::storage::{Config, DragConfig, EventMutation};
use crate::timeline::{is_blocked, Estimate, LayoutMode, TickPositions, TimeMapper};

/// Converts pointer gestures into snapped, conflict-checked reschedules.
#[derive(Debug, Clone)]
pub struct DragController {
    mapper: TimeMapper,
    settle_ms: u64,
    dot_offset_px: f64,
    scroll_epsilon_px: f64,
    session: Option<DragSession>,
    anchor: Option<ScrollAnchor>,
    next_id: u64,
}

impl DragController {
    pub fn new(mapper: TimeMapper, drag: &DragConfig) -> Self {
        Self {
            mapper,
            settle_ms: drag.settle_ms,
            dot_offset_px: drag.dot_offset_px,
            scroll_epsilon_px: drag.scroll_epsilon_px,
            session: None,
            anchor: None,
            next_id: 1,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.mapper(), &config.drag)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Option<DragPhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Expanded while a session is preparing or dragging.
    pub fn layout_mode(&self) -> LayoutMode {
        match self.phase() {
            Some(DragPhase::Preparing | DragPhase::Dragging) => LayoutMode::Expanded,
            _ => LayoutMode::Compact,
        }
    }

    /// Preview time and blocked flag of the active drag.
    pub fn preview(&self) -> Option<(DateTime<Utc>, bool)> {
        self.session
            .as_ref()
            .filter(|s| s.phase == DragPhase::Dragging)
            .map(|s| (s.preview_time, s.blocked))
    }

    pub fn mapper(&self) -> &TimeMapper {
        &self.mapper
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin dragging `event_id`. `card_y` is the card's current top, used
    /// to anchor scroll while the layout expands.
    ///
    /// Returns `None` if the event is unknown or another drag is in
    /// progress. A session that is only settling is replaced.
    pub fn drag_start(
        &mut self,
        event_id: &EventId,
        events: &[KitchenEvent],
        card_y: Option<f64>,
        at_ms: u64,
    ) -> Option<DragEvent> {
        if self.session.as_ref().is_some_and(DragSession::is_active) {
            debug!(event = %event_id, "drag start ignored, session in progress");
            return None;
        }
        let Some(event) = events.iter().find(|e| &e.id == event_id) else {
            warn!(event = %event_id, "drag start on unknown event");
            return None;
        };

        let id = SessionId(self.next_id);
        self.next_id += 1;
        let session = DragSession::new(id, event.id.clone(), event.start_time, at_ms);
        self.anchor = Some(self.anchor_for(id, card_y, at_ms));
        self.session = Some(session);
        debug!(session = %id, event = %event_id, "drag preparing");

        Some(DragEvent::Prepared {
            session: id,
            event_id: event.id.clone(),
            original_time: event.start_time,
        })
    }

    /// Process one pointer move.
    ///
    /// While preparing the sample is only remembered. While dragging it is
    /// mapped to a snapped preview time and checked for participant
    /// conflicts against `events`, excluding the dragged event itself.
    pub fn pointer_move<T: TickPositions + ?Sized>(
        &mut self,
        sample: PointerSample,
        surface: &T,
        events: &[KitchenEvent],
        at_ms: u64,
    ) -> Option<DragEvent> {
        let session = self.session.as_mut()?;
        match session.phase {
            DragPhase::Preparing => {
                session.pending = Some(sample);
                return None;
            }
            DragPhase::Settling => return None,
            DragPhase::Dragging => {}
        }

        let Some(event) = events.iter().find(|e| e.id == session.event_id) else {
            warn!(session = %session.id, event = %session.event_id, "dragged event vanished");
            return self.discard(DiscardReason::MissingEvent, None, at_ms);
        };

        let original = session.original_time;
        let ticks = surface.rendered_tick_positions();
        let (preview, estimate) = if ticks.is_empty() {
            (self.mapper.resolve_delta(original, sample.delta_y), Estimate::Delta)
        } else {
            let y = sample.dot_y(self.dot_offset_px)?;
            self.mapper.resolve(&ticks, y, original)
        };
        let blocked = is_blocked(
            preview,
            preview + event.duration(),
            &event.participants,
            events,
            Some(&event.id),
        );

        session.preview_time = preview;
        session.blocked = blocked;
        Some(DragEvent::Preview {
            session: session.id,
            preview_time: preview,
            blocked,
            estimate,
        })
    }

    /// Release the pointer.
    ///
    /// Commits the preview through `store` when it is unblocked and differs
    /// from the original time; otherwise nothing is mutated. Either way the
    /// layout starts collapsing, anchored at `card_y`.
    pub fn drag_end<S: EventMutation + ?Sized>(
        &mut self,
        store: &mut S,
        card_y: Option<f64>,
        at_ms: u64,
    ) -> Option<DragEvent> {
        let session = self.session.as_ref()?;
        let reason = match session.phase {
            DragPhase::Settling => return None,
            DragPhase::Preparing => DiscardReason::NotReady,
            DragPhase::Dragging if session.blocked => DiscardReason::Blocked,
            DragPhase::Dragging if !session.moved() => DiscardReason::Unchanged,
            DragPhase::Dragging => {
                let (id, event_id, from, to) =
                    (session.id, session.event_id.clone(), session.original_time, session.preview_time);
                if !store.reschedule(&event_id, to) {
                    warn!(session = %id, event = %event_id, "drop target vanished before commit");
                    return self.discard(DiscardReason::MissingEvent, card_y, at_ms);
                }
                info!(session = %id, event = %event_id, %from, %to, "drag committed");
                self.begin_settle(card_y, at_ms);
                return Some(DragEvent::Committed {
                    session: id,
                    event_id,
                    from,
                    to,
                });
            }
        };
        self.discard(reason, card_y, at_ms)
    }

    /// Abort the drag without committing. A no-op when idle or already
    /// settling.
    pub fn cancel(&mut self, card_y: Option<f64>, at_ms: u64) -> Option<DragEvent> {
        if !self.session.as_ref().is_some_and(DragSession::is_active) {
            return None;
        }
        self.discard(DiscardReason::Cancelled, card_y, at_ms)
    }

    /// Advance phase windows. Call from the host's ticker.
    pub fn tick(&mut self, at_ms: u64) -> Option<DragEvent> {
        let settle_ms = self.settle_ms;
        let session = self.session.as_mut()?;
        if session.elapsed(at_ms) < settle_ms {
            return None;
        }
        match session.phase {
            DragPhase::Preparing => {
                session.enter(DragPhase::Dragging, at_ms);
                let pending = session.pending.take();
                debug!(session = %session.id, "drag active");
                Some(DragEvent::Activated {
                    session: session.id,
                    pending,
                })
            }
            DragPhase::Settling => {
                let id = session.id;
                self.session = None;
                self.anchor = None;
                debug!(session = %id, "drag settled");
                Some(DragEvent::Settled { session: id })
            }
            DragPhase::Dragging => None,
        }
    }

    /// One scroll-anchoring frame for `session`, given the card's measured
    /// top. Frames for any session but the current one stop immediately.
    pub fn animation_frame(&self, session: SessionId, card_y: Option<f64>, at_ms: u64) -> Frame {
        let current = self.session.as_ref().filter(|s| s.id == session);
        let anchoring = current.is_some_and(|s| s.phase != DragPhase::Dragging);
        match self.anchor.filter(|a| a.session() == session) {
            Some(anchor) if anchoring => anchor.frame(card_y, at_ms),
            _ => Frame::STOP,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn anchor_for(&self, session: SessionId, card_y: Option<f64>, at_ms: u64) -> ScrollAnchor {
        ScrollAnchor::new(session, card_y, at_ms, self.settle_ms, self.scroll_epsilon_px)
    }

    /// Move the current session to settling, anchored at `card_y`.
    fn begin_settle(&mut self, card_y: Option<f64>, at_ms: u64) -> Option<(SessionId, EventId)> {
        let session = self.session.as_mut()?;
        session.clear_preview();
        session.enter(DragPhase::Settling, at_ms);
        let (id, event_id) = (session.id, session.event_id.clone());
        self.anchor = Some(self.anchor_for(id, card_y, at_ms));
        Some((id, event_id))
    }

    fn discard(&mut self, reason: DiscardReason, card_y: Option<f64>, at_ms: u64) -> Option<DragEvent> {
        let (session, event_id) = self.begin_settle(card_y, at_ms)?;
        debug!(%session, ?reason, "drag settling");
        Some(DragEvent::Discarded {
            session,
            event_id,
            reason,
        })
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

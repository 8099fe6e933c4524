use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drag::{PointerSample, SessionId};
use crate::schedule::EventId;
use crate::timeline::Estimate;

/// Why a drag ended without changing the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscardReason {
    /// Released before the expand animation finished.
    NotReady,
    /// The preview overlapped an event sharing a participant.
    Blocked,
    /// The preview equals the original time.
    Unchanged,
    /// The event disappeared from the store mid-drag.
    MissingEvent,
    Cancelled,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "not-ready",
            Self::Blocked => "blocked",
            Self::Unchanged => "unchanged",
            Self::MissingEvent => "missing-event",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Every drag state change produces a DragEvent.
/// The presentation layer applies them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DragEvent {
    /// Session created, layout expanding.
    Prepared {
        session: SessionId,
        event_id: EventId,
        original_time: DateTime<Utc>,
    },
    /// Expand window elapsed; pointer moves now compute previews.
    /// `pending` is the last sample seen while preparing.
    Activated {
        session: SessionId,
        pending: Option<PointerSample>,
    },
    Preview {
        session: SessionId,
        preview_time: DateTime<Utc>,
        blocked: bool,
        estimate: Estimate,
    },
    /// The event was moved; layout collapsing.
    Committed {
        session: SessionId,
        event_id: EventId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// The drag ended with no mutation; layout collapsing.
    Discarded {
        session: SessionId,
        event_id: EventId,
        reason: DiscardReason,
    },
    /// Collapse window elapsed; no session remains.
    Settled { session: SessionId },
}

impl DragEvent {
    pub fn session(&self) -> SessionId {
        match self {
            DragEvent::Prepared { session, .. }
            | DragEvent::Activated { session, .. }
            | DragEvent::Preview { session, .. }
            | DragEvent::Committed { session, .. }
            | DragEvent::Discarded { session, .. }
            | DragEvent::Settled { session } => *session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn notifications_serialize_with_type_tag() {
        let committed = DragEvent::Committed {
            session: SessionId(3),
            event_id: "soup".into(),
            from: Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2026, 3, 14, 9, 45, 0).unwrap(),
        };
        let json = serde_json::to_value(&committed).unwrap();
        assert_eq!(json["type"], "Committed");
        assert_eq!(json["session"], 3);
        assert_eq!(json["event_id"], "soup");

        let discarded = DragEvent::Discarded {
            session: SessionId(4),
            event_id: "soup".into(),
            reason: DiscardReason::NotReady,
        };
        let json = serde_json::to_value(&discarded).unwrap();
        assert_eq!(json["reason"], DiscardReason::NotReady.as_str());
        assert_eq!(discarded.session(), SessionId(4));
    }
}

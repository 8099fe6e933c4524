//! Render items produced by the flattener.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::{EventStatus, KitchenEvent};

/// Time scale of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Runs of empty hours collapse into a single gap marker.
    #[default]
    Compact,
    /// Every hour gets its own tick; used while dragging.
    Expanded,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Expanded => "expanded",
        }
    }
}

/// Pixels-per-hour for each layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutScale {
    pub compact_px_per_hour: f64,
    pub expanded_px_per_hour: f64,
}

impl LayoutScale {
    pub fn px_per_hour(&self, mode: LayoutMode) -> f64 {
        match mode {
            LayoutMode::Compact => self.compact_px_per_hour,
            LayoutMode::Expanded => self.expanded_px_per_hour,
        }
    }
}

impl Default for LayoutScale {
    fn default() -> Self {
        Self {
            compact_px_per_hour: 32.0,
            expanded_px_per_hour: 60.0,
        }
    }
}

/// One entry of the flattened timeline.
///
/// Items borrow the events they show and live for a single render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RenderItem<'a> {
    DaySeparator {
        date: NaiveDate,
        /// Local midnight opening `date`.
        starts_at: DateTime<Utc>,
    },
    NowLine,
    HourTick {
        hour: DateTime<Utc>,
        label: String,
    },
    CollapsedGap {
        /// Hours hidden between the bounding ticks.
        hours: u32,
        start_hour: DateTime<Utc>,
        end_hour: DateTime<Utc>,
        /// Where the now marker sits inside the gap (0.0 to 1.0), when the
        /// gap owns it.
        now_progress: Option<f64>,
    },
    Event {
        event: &'a KitchenEvent,
        status: EventStatus,
    },
}

impl RenderItem<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DaySeparator { .. } => "day-separator",
            Self::NowLine => "now-line",
            Self::HourTick { .. } => "hour-tick",
            Self::CollapsedGap { .. } => "collapsed-gap",
            Self::Event { .. } => "event",
        }
    }

    pub fn is_hour_tick(&self) -> bool {
        matches!(self, Self::HourTick { .. })
    }

    pub fn is_now_line(&self) -> bool {
        matches!(self, Self::NowLine)
    }

    /// True for a collapsed gap that carries the now marker.
    pub fn holds_now(&self) -> bool {
        matches!(
            self,
            Self::CollapsedGap {
                now_progress: Some(_),
                ..
            }
        )
    }
}

//! A headless stand-in for the render surface.
//!
//! Lays render items out on a linear pixel axis the same way the timeline
//! view would: consecutive ticks are spaced by their time difference at the
//! mode's pixels-per-hour, while a collapsed gap occupies a fixed height no
//! matter how many hours it hides. The CLI uses it to simulate drags and the
//! tests use it in place of real DOM measurements.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::item::RenderItem;
use super::mapper::{TickPosition, TickPositions};
use super::zone::HOUR_MS;
use crate::schedule::EventId;

/// Vertical anchor of an event's timeline dot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPosition {
    pub id: EventId,
    pub y: f64,
}

/// Measured positions of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyntheticSurface {
    pub ticks: Vec<TickPosition>,
    pub events: Vec<EventPosition>,
}

fn hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / HOUR_MS as f64
}

impl SyntheticSurface {
    pub fn measure(items: &[RenderItem<'_>], px_per_hour: f64, collapsed_gap_px: f64) -> Self {
        let mut surface = Self::default();
        let mut anchor: Option<TickPosition> = None;
        let mut after_gap = false;

        for item in items {
            match item {
                RenderItem::HourTick { hour, .. } => {
                    let y = match anchor {
                        None => 0.0,
                        Some(prev) if after_gap => prev.y + collapsed_gap_px,
                        Some(prev) => prev.y + hours(prev.time, *hour) * px_per_hour,
                    };
                    let tick = TickPosition::new(*hour, y);
                    surface.ticks.push(tick);
                    anchor = Some(tick);
                    after_gap = false;
                }
                RenderItem::CollapsedGap { .. } => after_gap = true,
                RenderItem::Event { event, .. } => {
                    let y = anchor.map_or(0.0, |a| a.y + hours(a.time, event.start_time) * px_per_hour);
                    surface.events.push(EventPosition {
                        id: event.id.clone(),
                        y,
                    });
                }
                RenderItem::DaySeparator { .. } | RenderItem::NowLine => {}
            }
        }
        surface
    }

    pub fn event_y(&self, id: &EventId) -> Option<f64> {
        self.events.iter().find(|p| &p.id == id).map(|p| p.y)
    }
}

impl TickPositions for SyntheticSurface {
    fn rendered_tick_positions(&self) -> Vec<TickPosition> {
        self.ticks.clone()
    }
}

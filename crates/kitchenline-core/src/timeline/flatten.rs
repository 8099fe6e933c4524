//! Timeline flattening.
//!
//! Turns a sparse, multi-day set of events into the linear sequence of render
//! items drawn on the vertical timeline: hour ticks, collapsed gaps, day
//! separators, a single now marker, and the events themselves.
//!
//! ## Algorithm
//!
//! Events are walked once in ascending start order across all days. Before
//! each event the hour boundaries between the last rendered hour and the
//! event's own hour are emitted. In compact mode a run of two or more
//! boundaries collapses to `tick, gap, tick`; expanded mode emits every
//! boundary. A day separator precedes the first item of every new local date,
//! and the now marker is placed exactly once, either as a `NowLine` item or
//! as the progress of the collapsed gap whose span contains `now`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::gap::{hours_between, HourRun};
use super::item::{LayoutMode, RenderItem};
use super::status::StatusEngine;
use super::zone::CalendarZone;
use crate::schedule::{KitchenEvent, PersonId};

/// Which events the timeline shows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "scope", content = "person")]
pub enum PersonFilter {
    #[default]
    All,
    Person(PersonId),
}

impl PersonFilter {
    pub fn matches(&self, event: &KitchenEvent) -> bool {
        match self {
            Self::All => true,
            Self::Person(person) => event.has_participant(person),
        }
    }
}

/// Group events by their calendar date, each day sorted by start time.
pub fn events_by_date(events: &[KitchenEvent]) -> BTreeMap<NaiveDate, Vec<&KitchenEvent>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&KitchenEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.date).or_default().push(event);
    }
    for day in grouped.values_mut() {
        day.sort_by_key(|e| e.start_time);
    }
    grouped
}

/// Builds render sequences. Deterministic for identical inputs.
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    zone: CalendarZone,
    status: StatusEngine,
    filter: PersonFilter,
}

impl Flattener {
    pub fn new(zone: CalendarZone) -> Self {
        Self {
            zone,
            status: StatusEngine::new(),
            filter: PersonFilter::All,
        }
    }

    pub fn with_status_engine(mut self, status: StatusEngine) -> Self {
        self.status = status;
        self
    }

    pub fn with_filter(mut self, filter: PersonFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// Flatten `events` for display at `now` in the given layout mode.
    pub fn flatten<'a, I>(&self, events: I, now: DateTime<Utc>, mode: LayoutMode) -> Vec<RenderItem<'a>>
    where
        I: IntoIterator<Item = &'a KitchenEvent>,
    {
        let mut sorted: Vec<&'a KitchenEvent> = events
            .into_iter()
            .filter(|e| self.filter.matches(e))
            .collect();
        sorted.sort_by_key(|e| e.start_time);

        let mut pass = Pass::new(self.zone, now);
        let mut last_rendered: Option<DateTime<Utc>> = None;

        for &event in &sorted {
            let start_hour = self.zone.floor_hour(event.start_time);

            match last_rendered {
                None => pass.hour_tick(start_hour),
                Some(last) => {
                    let hours = hours_between(last, start_hour);
                    match (mode, HourRun::from_hours(&hours, self.zone)) {
                        (_, None) | (LayoutMode::Expanded, _) => {
                            for hour in hours {
                                pass.hour_tick(hour);
                            }
                        }
                        (LayoutMode::Compact, Some(run)) => pass.collapsed_run(run, event.start_time),
                    }
                }
            }
            let mut last = last_rendered.map_or(start_hour, |l| l.max(start_hour));

            let date = self.zone.date_of(event.start_time);
            if pass.current_date != Some(date) {
                pass.day_separator(date);
            }

            if event.start_time > now {
                pass.now_line();
            }

            pass.items.push(RenderItem::Event {
                event,
                status: self.status.status(event, now),
            });

            let end_hour = self.zone.floor_hour(event.effective_end());
            if mode == LayoutMode::Expanded {
                for hour in hours_between(last, end_hour) {
                    pass.hour_tick(hour);
                }
            }
            last = last.max(end_hour);
            last_rendered = Some(last);
        }

        if let (Some(last_event), Some(last)) = (sorted.last(), last_rendered) {
            let next_hour = self.zone.next_hour(last_event.effective_end());
            if next_hour > last {
                pass.hour_tick(next_hour);
            }
        }

        if !sorted.is_empty() {
            pass.now_line();
        }

        pass.items
    }
}

/// Flatten with UTC wall clock and no participant filter.
pub fn flatten<'a, I>(events: I, now: DateTime<Utc>, mode: LayoutMode) -> Vec<RenderItem<'a>>
where
    I: IntoIterator<Item = &'a KitchenEvent>,
{
    Flattener::default().flatten(events, now, mode)
}

/// Number of now markers in a render sequence: `NowLine` items plus collapsed
/// gaps that carry the marker. A well-formed sequence for a non-empty event
/// set has exactly one.
pub fn now_marker_count(items: &[RenderItem<'_>]) -> usize {
    items
        .iter()
        .filter(|item| item.is_now_line() || item.holds_now())
        .count()
}

/// Mutable state of a single flatten pass.
struct Pass<'a> {
    zone: CalendarZone,
    now: DateTime<Utc>,
    items: Vec<RenderItem<'a>>,
    now_placed: bool,
    current_date: Option<NaiveDate>,
}

impl<'a> Pass<'a> {
    fn new(zone: CalendarZone, now: DateTime<Utc>) -> Self {
        Self {
            zone,
            now,
            items: Vec::new(),
            now_placed: false,
            current_date: None,
        }
    }

    fn day_separator(&mut self, date: NaiveDate) {
        self.items.push(RenderItem::DaySeparator {
            date,
            starts_at: self.zone.midnight_of(date),
        });
        self.current_date = Some(date);
    }

    /// Push the now line unless the marker was already placed.
    fn now_line(&mut self) {
        if !self.now_placed {
            self.items.push(RenderItem::NowLine);
            self.now_placed = true;
        }
    }

    fn hour_tick(&mut self, hour: DateTime<Utc>) {
        let date = self.zone.date_of(hour);
        if self.current_date != Some(date) {
            self.day_separator(date);
        }
        if self.now < hour {
            self.now_line();
        }
        self.items.push(RenderItem::HourTick {
            hour,
            label: self.zone.hour_label(hour),
        });
    }

    /// Emit `first, [separator], gap, last` for a run of empty hours that
    /// ends at an event starting at `next_start`.
    fn collapsed_run(&mut self, run: HourRun, next_start: DateTime<Utc>) {
        // The gap claims the marker before any tick can.
        let now_progress = if self.now_placed {
            None
        } else {
            run.now_progress(self.now, next_start)
        };
        if now_progress.is_some() {
            self.now_placed = true;
        }

        self.hour_tick(run.first);
        if let Some(midnight) = run.midnight {
            self.day_separator(self.zone.date_of(midnight));
        }
        self.items.push(RenderItem::CollapsedGap {
            hours: run.hidden,
            start_hour: run.first,
            end_hour: run.last,
            now_progress,
        });
        self.hour_tick(run.last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{EventKind, EventStatus};
    use chrono::{Duration, TimeZone};

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn point(id: &str, start: DateTime<Utc>) -> KitchenEvent {
        KitchenEvent::new(id, EventKind::Eating, id, start, CalendarZone::utc()).with_participant("alex")
    }

    fn ranged(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> KitchenEvent {
        KitchenEvent::try_new(id, EventKind::Cooking, id, start, end, CalendarZone::utc())
            .unwrap()
            .with_participant("alex")
    }

    /// Compact textual form: `D` separator, `N` now line, `T10` tick at 10:00,
    /// `G2` gap hiding two hours (`G2@0.5` with progress), `E:id` event.
    fn shape(items: &[RenderItem<'_>]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                RenderItem::DaySeparator { date, .. } => format!("D{}", date.format("%d")),
                RenderItem::NowLine => "N".to_string(),
                RenderItem::HourTick { hour, .. } => format!("T{}", hour.format("%H")),
                RenderItem::CollapsedGap {
                    hours, now_progress, ..
                } => match now_progress {
                    Some(p) => format!("G{hours}@{p}"),
                    None => format!("G{hours}"),
                },
                RenderItem::Event { event, .. } => format!("E:{}", event.id),
            })
            .collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        let events: Vec<KitchenEvent> = Vec::new();
        let items = flatten(&events, at(14, 12, 0), LayoutMode::Compact);
        assert!(items.is_empty());
    }

    #[test]
    fn single_event_has_leading_and_trailing_ticks() {
        let events = vec![point("a", at(14, 10, 15))];
        for (now, expected) in [
            (at(14, 9, 0), vec!["D14", "N", "T10", "E:a", "T11"]),
            (at(14, 10, 5), vec!["D14", "T10", "N", "E:a", "T11"]),
            (at(14, 10, 15), vec!["D14", "T10", "E:a", "N", "T11"]),
            (at(14, 12, 0), vec!["D14", "T10", "E:a", "T11", "N"]),
        ] {
            let items = flatten(&events, now, LayoutMode::Compact);
            assert_eq!(shape(&items), expected, "now = {now}");
            assert_eq!(now_marker_count(&items), 1);
        }
    }

    #[test]
    fn three_hour_gap_collapses_in_compact_mode() {
        let events = vec![point("a", at(14, 10, 0)), point("b", at(14, 13, 0))];
        let items = flatten(&events, at(14, 9, 0), LayoutMode::Compact);
        assert_eq!(
            shape(&items),
            vec!["D14", "N", "T10", "E:a", "T11", "G2", "T13", "E:b", "T14"]
        );
    }

    #[test]
    fn three_hour_gap_expands_to_ticks() {
        let events = vec![point("a", at(14, 10, 0)), point("b", at(14, 13, 0))];
        let items = flatten(&events, at(14, 9, 0), LayoutMode::Expanded);
        assert_eq!(
            shape(&items),
            vec!["D14", "N", "T10", "E:a", "T11", "T12", "T13", "E:b", "T14"]
        );
        assert!(!items.iter().any(|i| matches!(i, RenderItem::CollapsedGap { .. })));
    }

    #[test]
    fn single_boundary_is_not_collapsed() {
        let events = vec![point("a", at(14, 10, 0)), point("b", at(14, 11, 20))];
        let items = flatten(&events, at(14, 11, 10), LayoutMode::Compact);
        assert_eq!(shape(&items), vec!["D14", "T10", "E:a", "T11", "N", "E:b", "T12"]);
    }

    #[test]
    fn events_in_same_hour_share_a_tick() {
        let events = vec![point("a", at(14, 10, 0)), point("b", at(14, 10, 40))];
        let items = flatten(&events, at(14, 8, 0), LayoutMode::Compact);
        assert_eq!(shape(&items), vec!["D14", "N", "T10", "E:a", "E:b", "T11"]);
    }

    #[test]
    fn gap_claims_now_with_progress() {
        let events = vec![point("a", at(14, 10, 0)), point("b", at(14, 14, 20))];
        let items = flatten(&events, at(14, 12, 30), LayoutMode::Compact);
        assert_eq!(
            shape(&items),
            vec!["D14", "T10", "E:a", "T11", "G3@0.5", "T14", "E:b", "T15"]
        );
        assert_eq!(now_marker_count(&items), 1);
    }

    #[test]
    fn gap_keeps_now_pinned_after_closing_tick() {
        let events = vec![point("a", at(14, 10, 0)), point("b", at(14, 14, 20))];
        let items = flatten(&events, at(14, 14, 10), LayoutMode::Compact);
        assert_eq!(
            shape(&items),
            vec!["D14", "T10", "E:a", "T11", "G3@1", "T14", "E:b", "T15"]
        );
    }

    #[test]
    fn midnight_inside_gap_inserts_separator() {
        let events = vec![point("a", at(14, 21, 0)), point("b", at(15, 3, 0))];
        let items = flatten(&events, at(16, 0, 0), LayoutMode::Compact);
        assert_eq!(
            shape(&items),
            vec!["D14", "T21", "E:a", "T22", "D15", "G5", "T03", "E:b", "T04", "N"]
        );
    }

    #[test]
    fn midnight_as_tick_inserts_separator_in_expanded_mode() {
        let events = vec![point("a", at(14, 22, 30)), point("b", at(15, 1, 0))];
        let items = flatten(&events, at(14, 20, 0), LayoutMode::Expanded);
        assert_eq!(
            shape(&items),
            vec!["D14", "N", "T22", "E:a", "T23", "D15", "T00", "T01", "E:b", "T02"]
        );
    }

    #[test]
    fn separator_before_event_without_new_tick() {
        let events = vec![
            ranged("a", at(14, 23, 0), at(15, 1, 30)),
            point("b", at(15, 1, 45)),
        ];
        let items = flatten(&events, at(14, 20, 0), LayoutMode::Compact);
        assert_eq!(
            shape(&items),
            vec!["D14", "N", "T23", "E:a", "D15", "E:b", "T02"]
        );
    }

    #[test]
    fn expanded_mode_ticks_through_long_events() {
        let events = vec![ranged("a", at(14, 10, 0), at(14, 12, 30))];
        let expanded = flatten(&events, at(14, 9, 0), LayoutMode::Expanded);
        assert_eq!(
            shape(&expanded),
            vec!["D14", "N", "T10", "E:a", "T11", "T12", "T13"]
        );
        let compact = flatten(&events, at(14, 9, 0), LayoutMode::Compact);
        assert_eq!(shape(&compact), vec!["D14", "N", "T10", "E:a", "T13"]);
    }

    #[test]
    fn overlapping_events_never_repeat_ticks() {
        let events = vec![
            ranged("a", at(14, 10, 0), at(14, 13, 0)),
            point("b", at(14, 11, 0)),
            point("c", at(14, 14, 0)),
        ];
        let items = flatten(&events, at(14, 9, 0), LayoutMode::Expanded);
        let ticks: Vec<_> = items.iter().filter(|i| i.is_hour_tick()).collect();
        let mut hours: Vec<_> = ticks
            .iter()
            .map(|t| match t {
                RenderItem::HourTick { hour, .. } => *hour,
                _ => unreachable!(),
            })
            .collect();
        let before = hours.len();
        hours.dedup();
        assert_eq!(before, hours.len());
        assert!(hours.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn exactly_one_now_marker_when_many_events_straddle_now() {
        let events = vec![
            ranged("a", at(14, 11, 0), at(14, 13, 0)),
            ranged("b", at(14, 11, 30), at(14, 12, 30)),
            point("c", at(14, 12, 0)),
            point("d", at(14, 16, 0)),
        ];
        for mode in [LayoutMode::Compact, LayoutMode::Expanded] {
            for minutes in (0..600).step_by(7) {
                let now = at(14, 8, 0) + Duration::minutes(minutes);
                let items = flatten(&events, now, mode);
                assert_eq!(now_marker_count(&items), 1, "now = {now}, mode = {mode:?}");
            }
        }
    }

    #[test]
    fn all_past_events_put_now_at_end() {
        let events = vec![point("a", at(14, 8, 0)), point("b", at(14, 9, 0))];
        let items = flatten(&events, at(15, 12, 0), LayoutMode::Compact);
        assert_eq!(items.last(), Some(&RenderItem::NowLine));
    }

    #[test]
    fn events_carry_live_status() {
        let events = vec![
            point("a", at(14, 8, 0)).with_status(EventStatus::Done),
            point("b", at(14, 9, 0)),
            point("c", at(14, 12, 20)),
        ];
        let items = flatten(&events, at(14, 12, 0), LayoutMode::Compact);
        let statuses: Vec<_> = items
            .iter()
            .filter_map(|i| match i {
                RenderItem::Event { status, .. } => Some(*status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![EventStatus::Done, EventStatus::Overdue, EventStatus::Soon]);
    }

    #[test]
    fn person_filter_limits_events() {
        let events = vec![
            point("a", at(14, 10, 0)),
            KitchenEvent::new("s", EventKind::Grocery, "s", at(14, 11, 0), CalendarZone::utc())
                .with_participant("sam"),
        ];
        let flattener = Flattener::new(CalendarZone::utc()).with_filter(PersonFilter::Person("sam".into()));
        let items = flattener.flatten(&events, at(14, 9, 0), LayoutMode::Compact);
        assert_eq!(shape(&items), vec!["D14", "N", "T11", "E:s", "T12"]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = point("a", at(14, 10, 0));
        let b = point("b", at(14, 15, 0));
        let forward = vec![a.clone(), b.clone()];
        let backward = vec![b, a];
        let now = at(14, 12, 0);
        assert_eq!(
            flatten(&forward, now, LayoutMode::Compact),
            flatten(&backward, now, LayoutMode::Compact)
        );
    }

    #[test]
    fn accepts_events_grouped_by_date() {
        let events = vec![point("b", at(15, 9, 0)), point("a", at(14, 10, 0))];
        let grouped = events_by_date(&events);
        assert_eq!(grouped.len(), 2);
        let items = flatten(grouped.values().flatten().copied(), at(14, 0, 0), LayoutMode::Compact);
        let ids: Vec<_> = items
            .iter()
            .filter_map(|i| match i {
                RenderItem::Event { event, .. } => Some(event.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn respects_calendar_zone() {
        // 23:30 UTC is 01:30 the next day at +02:00.
        let zone = CalendarZone::from_offset_minutes(120).unwrap();
        let events = vec![KitchenEvent::new("late", EventKind::Dishwasher, "late", at(14, 23, 30), zone)];
        let items = Flattener::new(zone).flatten(&events, at(14, 20, 0), LayoutMode::Compact);
        match &items[0] {
            RenderItem::DaySeparator { date, .. } => {
                assert_eq!(*date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap())
            }
            other => panic!("expected separator, got {other:?}"),
        }
        match &items[2] {
            RenderItem::HourTick { label, .. } => assert_eq!(label, "1 AM"),
            other => panic!("expected tick, got {other:?}"),
        }
    }
}

//! Participant-scoped overlap detection.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::schedule::{EventId, KitchenEvent, PersonId};

/// Whether `[start1, end1]` and `[start2, end2]` overlap.
///
/// Adjacent ranges (`end1 == start2`) do not overlap.
pub fn times_overlap<T: PartialOrd>(start1: T, end1: T, start2: T, end2: T) -> bool {
    start1 < end2 && end1 > start2
}

/// Whether placing an event at `[candidate_start, candidate_end]` collides with
/// any other event sharing at least one of `participants`.
///
/// The event identified by `exclude` is skipped. Events without an end time
/// occupy the zero-width range at their start.
pub fn is_blocked(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    participants: &BTreeSet<PersonId>,
    all_events: &[KitchenEvent],
    exclude: Option<&EventId>,
) -> bool {
    find_conflict(candidate_start, candidate_end, participants, all_events, exclude).is_some()
}

/// First event that blocks the candidate range, if any.
pub fn find_conflict<'a>(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    participants: &BTreeSet<PersonId>,
    all_events: &'a [KitchenEvent],
    exclude: Option<&EventId>,
) -> Option<&'a KitchenEvent> {
    all_events.iter().find(|other| {
        if exclude == Some(&other.id) {
            return false;
        }
        if !other.shares_participant(participants) {
            return false;
        }
        times_overlap(
            candidate_start,
            candidate_end,
            other.start_time,
            other.effective_end(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::EventKind;
    use crate::timeline::CalendarZone;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    fn span(id: &str, person: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> KitchenEvent {
        KitchenEvent::try_new(id, EventKind::Cooking, id, start, end, CalendarZone::utc())
            .unwrap()
            .with_participant(person)
    }

    fn people(ids: &[&str]) -> BTreeSet<PersonId> {
        ids.iter().map(|p| PersonId::from(*p)).collect()
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        assert!(!times_overlap(10, 11, 11, 12));
        assert!(!times_overlap(11, 12, 10, 11));
        assert!(times_overlap(10, 12, 11, 13));
    }

    #[test]
    fn only_shared_participants_block() {
        let events = vec![
            span("a", "alex", at(10, 0), at(11, 0)),
            span("b", "alex", at(11, 0), at(12, 0)),
            span("c", "sam", at(10, 30), at(11, 30)),
        ];
        let alex = people(&["alex"]);
        let a = EventId::from("a");

        // Overlapping only Sam's event with Alex's participants.
        assert!(!is_blocked(at(9, 0), at(10, 45), &alex, &events, Some(&a)));
        // Overlapping Alex's own 11:00-12:00 slot.
        assert!(is_blocked(at(10, 30), at(11, 30), &alex, &events, Some(&a)));
        let hit = find_conflict(at(10, 30), at(11, 30), &alex, &events, Some(&a)).unwrap();
        assert_eq!(hit.id.as_str(), "b");
    }

    #[test]
    fn moved_event_is_excluded() {
        let events = vec![span("a", "alex", at(10, 0), at(11, 0))];
        let alex = people(&["alex"]);
        assert!(!is_blocked(at(10, 15), at(11, 15), &alex, &events, Some(&EventId::from("a"))));
        assert!(is_blocked(at(10, 15), at(11, 15), &alex, &events, None));
    }

    #[test]
    fn point_events_block_only_when_spanned() {
        let point = KitchenEvent::new("p", EventKind::Defrost, "Defrost", at(12, 0), CalendarZone::utc())
            .with_participant("alex");
        let events = vec![point];
        let alex = people(&["alex"]);
        assert!(!is_blocked(at(11, 0), at(12, 0), &alex, &events, None));
        assert!(!is_blocked(at(12, 0), at(13, 0), &alex, &events, None));
        assert!(is_blocked(at(11, 30), at(12, 30), &alex, &events, None));
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(s1 in -1000i64..1000, l1 in 0i64..500, s2 in -1000i64..1000, l2 in 0i64..500) {
            let (e1, e2) = (s1 + l1, s2 + l2);
            prop_assert_eq!(times_overlap(s1, e1, s2, e2), times_overlap(s2, e2, s1, e1));
        }

        #[test]
        fn touching_never_overlaps(s1 in -1000i64..1000, l1 in 0i64..500, l2 in 0i64..500) {
            let e1 = s1 + l1;
            prop_assert!(!times_overlap(s1, e1, e1, e1 + l2));
        }
    }
}

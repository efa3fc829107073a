// Time-slot arithmetic for field reservations

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Shortest bookable slot
pub const MIN_BOOKING_MINUTES: i64 = 30;

/// Half-open interval [start, end) within one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeRange {
    #[schema(value_type = String, example = "18:00:00")]
    pub start: NaiveTime,
    #[schema(value_type = String, example = "19:30:00")]
    pub end: NaiveTime,
}

impl TimeRange {
    /// None unless `end` is strictly after `start`
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Touching ranges (one ends when the other starts) do not overlap
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn within(&self, open: NaiveTime, close: NaiveTime) -> bool {
        self.start >= open && self.end <= close
    }
}

/// Wall-clock time of the server, used for "not in the past" checks
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Seconds the server's local zone is ahead of UTC
pub fn local_utc_offset_secs() -> i32 {
    Local::now().offset().local_minus_utc()
}

/// A slot is in the past once its start moment has passed
pub fn starts_before(date: NaiveDate, start: NaiveTime, now: NaiveDateTime) -> bool {
    date.and_time(start) < now
}

/// Gaps between booked ranges inside opening hours.
/// Booked ranges may be unsorted and may overlap each other.
pub fn free_ranges(open: NaiveTime, close: NaiveTime, booked: &[TimeRange]) -> Vec<TimeRange> {
    let mut sorted: Vec<TimeRange> = booked.to_vec();
    sorted.sort_by_key(|r| r.start);

    let mut free = Vec::new();
    let mut cursor = open;
    for range in sorted {
        if range.end <= cursor {
            continue;
        }
        if range.start >= close {
            break;
        }
        if let Some(gap) = TimeRange::new(cursor, range.start.min(close)) {
            free.push(gap);
        }
        cursor = cursor.max(range.end);
        if cursor >= close {
            return free;
        }
    }
    if let Some(tail) = TimeRange::new(cursor, close) {
        free.push(tail);
    }
    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn range(sh: u32, sm: u32, eh: u32, em: u32) -> TimeRange {
        TimeRange::new(t(sh, sm), t(eh, em)).unwrap()
    }

    #[test]
    fn test_local_offset_matches_local_clock() {
        let drift = local_now() - chrono::Utc::now().naive_utc();
        let offset = i64::from(local_utc_offset_secs());
        assert!((drift.num_seconds() - offset).abs() <= 2);
    }

    #[test]
    fn test_new_rejects_empty_and_reversed() {
        assert!(TimeRange::new(t(10, 0), t(10, 0)).is_none());
        assert!(TimeRange::new(t(11, 0), t(10, 0)).is_none());
        assert_eq!(range(10, 0, 11, 30).minutes(), 90);
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        let a = range(8, 0, 9, 0);
        let b = range(9, 0, 10, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_contained_range_overlaps() {
        let outer = range(8, 0, 12, 0);
        let inner = range(9, 0, 10, 0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_within_opening_hours() {
        assert!(range(6, 0, 7, 0).within(t(6, 0), t(22, 0)));
        assert!(range(21, 0, 22, 0).within(t(6, 0), t(22, 0)));
        assert!(!range(5, 30, 7, 0).within(t(6, 0), t(22, 0)));
        assert!(!range(21, 30, 22, 30).within(t(6, 0), t(22, 0)));
    }

    #[test]
    fn test_starts_before() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let now = date.and_time(t(10, 0));
        assert!(starts_before(date, t(9, 59), now));
        assert!(!starts_before(date, t(10, 0), now));
        assert!(!starts_before(date.succ_opt().unwrap(), t(6, 0), now));
    }

    #[test]
    fn test_free_ranges_without_bookings() {
        assert_eq!(free_ranges(t(6, 0), t(22, 0), &[]), vec![range(6, 0, 22, 0)]);
    }

    #[test]
    fn test_free_ranges_with_unsorted_overlapping_bookings() {
        let booked = [range(18, 0, 20, 0), range(8, 0, 9, 0), range(8, 30, 10, 0)];
        assert_eq!(
            free_ranges(t(6, 0), t(22, 0), &booked),
            vec![range(6, 0, 8, 0), range(10, 0, 18, 0), range(20, 0, 22, 0)]
        );
    }

    #[test]
    fn test_free_ranges_fully_booked() {
        let booked = [range(6, 0, 14, 0), range(14, 0, 22, 0)];
        assert!(free_ranges(t(6, 0), t(22, 0), &booked).is_empty());
    }

    fn arb_range() -> impl Strategy<Value = TimeRange> {
        (0u32..23 * 60, 1u32..180).prop_map(|(start, len)| {
            let end = (start + len).min(23 * 60 + 59);
            TimeRange::new(
                NaiveTime::from_hms_opt(start / 60, start % 60, 0).unwrap(),
                NaiveTime::from_hms_opt(end / 60, end % 60, 0).unwrap(),
            )
            .unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in arb_range(), b in arb_range()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_range_overlaps_itself(a in arb_range()) {
            prop_assert!(a.overlaps(&a));
        }

        #[test]
        fn prop_free_ranges_never_overlap_bookings(
            booked in prop::collection::vec(arb_range(), 0..8)
        ) {
            let free = free_ranges(t(6, 0), t(22, 0), &booked);
            for gap in &free {
                prop_assert!(gap.within(t(6, 0), t(22, 0)));
                for b in &booked {
                    prop_assert!(!gap.overlaps(b));
                }
            }
        }
    }
}

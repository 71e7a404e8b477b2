#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use padelbook_common::models::TimeRange;
    use proptest::prelude::*;

    fn minutes(m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap()
    }

    fn time_range() -> impl Strategy<Value = TimeRange> {
        (0u32..1439)
            .prop_flat_map(|start| (Just(start), start + 1..1440))
            .prop_map(|(start, end)| TimeRange::new(minutes(start), minutes(end)).unwrap())
    }

    proptest! {
        #[test]
        fn test_overlap_is_symmetric(a in time_range(), b in time_range()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn test_range_overlaps_itself(a in time_range()) {
            prop_assert!(a.overlaps(&a));
        }

        // Test that overlap is exactly "neither range ends before the other starts"
        #[test]
        fn test_overlap_matches_separation(a in time_range(), b in time_range()) {
            let separated = a.end <= b.start || b.end <= a.start;
            prop_assert_eq!(a.overlaps(&b), !separated);
        }

        #[test]
        fn test_adjacent_ranges_do_not_overlap(start in 0u32..1300, first in 1u32..60, second in 1u32..60) {
            let a = TimeRange::new(minutes(start), minutes(start + first)).unwrap();
            let b = TimeRange::new(minutes(start + first), minutes(start + first + second)).unwrap();
            prop_assert!(!a.overlaps(&b));
            prop_assert!(!b.overlaps(&a));
        }
    }
}

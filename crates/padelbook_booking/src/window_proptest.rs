#[cfg(test)]
mod tests {
    use crate::window::ReservationWindowRule;
    use chrono::{Days, Duration, NaiveDate, NaiveTime};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    fn date_from_offset(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    }

    fn club_zone() -> impl Strategy<Value = Tz> {
        prop_oneof![
            Just(chrono_tz::Europe::Paris),
            Just(chrono_tz::UTC),
            Just(chrono_tz::America::New_York),
            Just(chrono_tz::Australia::Sydney),
        ]
    }

    proptest! {
        // Test that the local opening is always three calendar days earlier at 08:00
        #[test]
        fn test_opening_is_three_days_before_at_eight(offset in 0u64..20_000) {
            let match_date = date_from_offset(offset);
            let opening = ReservationWindowRule::default().opens_at_local(match_date);

            prop_assert_eq!(opening.time(), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
            prop_assert_eq!(match_date - opening.date(), Duration::days(3));
        }

        // Test that the resolved instant shows 08:00 on the club's wall clock
        #[test]
        fn test_resolved_instant_is_local_opening(offset in 0u64..20_000, tz in club_zone()) {
            let match_date = date_from_offset(offset);
            let rule = ReservationWindowRule::default();
            let opens_at = rule.opens_at(match_date, tz);

            prop_assert_eq!(opens_at.with_timezone(&tz).naive_local(), rule.opens_at_local(match_date));
            // idempotent
            prop_assert_eq!(opens_at, rule.opens_at(match_date, tz));
        }

        // Test that the window opens strictly after the opening instant
        #[test]
        fn test_window_open_is_strict(
            offset in 0u64..20_000,
            tz in club_zone(),
            delta_ms in 1i64..1_000_000,
        ) {
            let match_date = date_from_offset(offset);
            let rule = ReservationWindowRule::default();
            let opens_at = rule.opens_at(match_date, tz);

            prop_assert!(!rule.is_window_already_open(match_date, opens_at, tz));
            prop_assert!(!rule.is_window_already_open(match_date, opens_at - Duration::milliseconds(delta_ms), tz));
            prop_assert!(rule.is_window_already_open(match_date, opens_at + Duration::milliseconds(delta_ms), tz));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::conflict::{find_blocking, ConflictChecker};
    use crate::error::BookingError;
    use crate::mocks::MockBookings;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use padelbook_common::models::{BookingRequest, BookingStatus, Court, Partner, TimeRange};
    use padelbook_common::StoreError;
    use std::sync::Arc;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn booking(court: Court, start: NaiveTime, end: NaiveTime, status: BookingStatus) -> BookingRequest {
        BookingRequest {
            id: format!("{}-{}", court.number(), start),
            user_id: "u1".to_string(),
            court,
            match_date: date(),
            start_time: start,
            end_time: end,
            partners: [
                Partner::normalized("a", "b"),
                Partner::normalized("c", "d"),
                Partner::normalized("e", "f"),
            ],
            status,
            reservation_opens_at: Utc.with_ymd_and_hms(2025, 6, 17, 6, 0, 0).unwrap(),
            created_at: None,
        }
    }

    #[test]
    fn test_only_pending_and_confirmed_block() {
        let range = TimeRange::new(t(18, 30), t(20, 0)).unwrap();
        let failed = [booking(Court::Padel1, t(18, 0), t(19, 30), BookingStatus::Failed)];
        assert!(find_blocking(&failed, Court::Padel1, date(), &range).is_none());

        let confirmed = [booking(Court::Padel1, t(18, 0), t(19, 30), BookingStatus::Confirmed)];
        assert!(find_blocking(&confirmed, Court::Padel1, date(), &range).is_some());

        let pending = [booking(Court::Padel1, t(18, 0), t(19, 30), BookingStatus::Pending)];
        assert!(find_blocking(&pending, Court::Padel1, date(), &range).is_some());
    }

    #[test]
    fn test_other_court_date_or_adjacent_slot_do_not_block() {
        let bookings = [booking(Court::Padel1, t(18, 0), t(19, 30), BookingStatus::Pending)];
        let same = TimeRange::new(t(18, 0), t(19, 30)).unwrap();
        let after = TimeRange::new(t(19, 30), t(21, 0)).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();

        assert!(find_blocking(&bookings, Court::Padel2, date(), &same).is_none());
        assert!(find_blocking(&bookings, Court::Padel1, other_day, &same).is_none());
        assert!(find_blocking(&bookings, Court::Padel1, date(), &after).is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_never_reported_as_free() {
        let mut store = MockBookings::new();
        store
            .expect_has_conflict()
            .returning(|_, _, _| Err(StoreError::Unavailable("connection refused".into())));
        let checker = ConflictChecker::new(Arc::new(store));

        let result = checker
            .check_conflict(
                Court::Padel1,
                date(),
                TimeRange::new(t(18, 0), t(19, 30)).unwrap(),
            )
            .await;
        assert!(matches!(result, Err(BookingError::Storage(_))));
    }
}

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use padelbook_common::models::{
    BookingStatus, ClubCredentials, Court, NewBookingRequest, Partner, Role, TimeRange,
};
use padelbook_common::{BookingStore, InsertOutcome, ProfileStore};
use padelbook_db::{Backend, DbClient, SqlBookingRepository, SqlProfileRepository};

async fn setup() -> (DbClient, SqlBookingRepository, SqlProfileRepository) {
    let db_client = DbClient::from_url("sqlite::memory:")
        .await
        .expect("in-memory database");
    let bookings = SqlBookingRepository::new(db_client.clone());
    bookings.init_schema().await.expect("booking schema");
    let profiles = SqlProfileRepository::new(db_client.clone());
    profiles.init_schema().await.expect("profile schema");
    (db_client, bookings, profiles)
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
}

fn request(user_id: &str, court: Court, start: NaiveTime, end: NaiveTime) -> NewBookingRequest {
    NewBookingRequest {
        user_id: user_id.to_string(),
        court,
        match_date: date(),
        time_range: TimeRange::new(start, end).unwrap(),
        partners: [
            Partner::normalized("jean", "dupont"),
            Partner::normalized("marie", "curie"),
            Partner::normalized("paul", "martin"),
        ],
        reservation_opens_at: Utc.with_ymd_and_hms(2025, 6, 17, 6, 0, 0).unwrap(),
    }
}

async fn insert(store: &SqlBookingRepository, req: NewBookingRequest) -> String {
    match store.insert_if_no_conflict(req).await.unwrap() {
        InsertOutcome::Inserted(booking) => booking.id,
        InsertOutcome::Conflict => panic!("unexpected conflict"),
    }
}

#[tokio::test]
async fn test_insert_and_list_round_trip() {
    let (_, store, _) = setup().await;
    let id = insert(&store, request("u1", Court::Padel2, t(18, 0), t(19, 30))).await;

    let bookings = store.list_user_bookings("u1").await.unwrap();
    assert_eq!(bookings.len(), 1);
    let booking = &bookings[0];
    assert_eq!(booking.id, id);
    assert_eq!(booking.court, Court::Padel2);
    assert_eq!(booking.match_date, date());
    assert_eq!(booking.start_time, t(18, 0));
    assert_eq!(booking.end_time, t(19, 30));
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.partners[0].last_name, "DUPONT");
    assert_eq!(
        booking.reservation_opens_at,
        Utc.with_ymd_and_hms(2025, 6, 17, 6, 0, 0).unwrap()
    );
    assert!(booking.created_at.is_some());

    assert!(store.list_user_bookings("someone-else").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_overlapping_insert_is_rejected() {
    let (_, store, _) = setup().await;
    insert(&store, request("u1", Court::Padel1, t(18, 0), t(19, 30))).await;

    let outcome = store
        .insert_if_no_conflict(request("u2", Court::Padel1, t(19, 0), t(20, 30)))
        .await
        .unwrap();
    assert_eq!(outcome, InsertOutcome::Conflict);
    assert_eq!(store.list_all_bookings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_adjacent_and_other_court_do_not_conflict() {
    let (_, store, _) = setup().await;
    insert(&store, request("u1", Court::Padel1, t(18, 0), t(19, 30))).await;

    assert!(!store
        .has_conflict(Court::Padel1, date(), TimeRange::new(t(19, 30), t(21, 0)).unwrap())
        .await
        .unwrap());
    assert!(!store
        .has_conflict(Court::Padel2, date(), TimeRange::new(t(18, 0), t(19, 30)).unwrap())
        .await
        .unwrap());
    assert!(store
        .has_conflict(Court::Padel1, date(), TimeRange::new(t(17, 0), t(18, 30)).unwrap())
        .await
        .unwrap());

    insert(&store, request("u2", Court::Padel1, t(19, 30), t(21, 0))).await;
}

#[tokio::test]
async fn test_concurrent_overlapping_inserts_store_only_one() {
    let (_, store, _) = setup().await;

    let (a, b) = tokio::join!(
        store.insert_if_no_conflict(request("u1", Court::Padel3, t(10, 0), t(11, 0))),
        store.insert_if_no_conflict(request("u2", Court::Padel3, t(10, 30), t(11, 30))),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let inserted = outcomes
        .iter()
        .filter(|o| matches!(o, InsertOutcome::Inserted(_)))
        .count();
    assert_eq!(inserted, 1);
    assert!(outcomes.contains(&InsertOutcome::Conflict));
    assert_eq!(store.list_all_bookings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_booking_frees_the_slot() {
    let (db_client, store, _) = setup().await;
    let id = insert(&store, request("u1", Court::Padel1, t(18, 0), t(19, 30))).await;

    db_client
        .execute(&format!(
            "UPDATE bookings SET status = 'failed' WHERE id = '{}'",
            id
        ))
        .await
        .unwrap();

    assert!(!store
        .has_conflict(Court::Padel1, date(), TimeRange::new(t(18, 0), t(19, 30)).unwrap())
        .await
        .unwrap());
    insert(&store, request("u2", Court::Padel1, t(18, 0), t(19, 30))).await;
}

#[tokio::test]
async fn test_cancel_only_removes_own_pending_requests() {
    let (db_client, store, _) = setup().await;
    let pending = insert(&store, request("u1", Court::Padel1, t(9, 0), t(10, 30))).await;
    let confirmed = insert(&store, request("u1", Court::Padel2, t(9, 0), t(10, 30))).await;
    db_client
        .execute(&format!(
            "UPDATE bookings SET status = 'confirmed' WHERE id = '{}'",
            confirmed
        ))
        .await
        .unwrap();

    assert!(!store.cancel_pending(&pending, "intruder").await.unwrap());
    assert!(!store.cancel_pending(&confirmed, "u1").await.unwrap());
    assert!(store.cancel_pending(&pending, "u1").await.unwrap());
    assert!(!store.cancel_pending(&pending, "u1").await.unwrap());

    let remaining = store.list_user_bookings("u1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_admin_cancel_ignores_owner() {
    let (_, store, _) = setup().await;
    let id = insert(&store, request("u1", Court::Padel1, t(9, 0), t(10, 30))).await;

    assert!(store.cancel_pending_any(&id).await.unwrap());
    assert!(store.list_all_bookings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bookings_are_listed_most_recent_first() {
    let (_, store, _) = setup().await;
    insert(&store, request("u1", Court::Padel1, t(9, 0), t(10, 30))).await;
    insert(&store, request("u1", Court::Padel1, t(18, 0), t(19, 30))).await;
    let mut later = request("u1", Court::Padel1, t(8, 0), t(9, 0));
    later.match_date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
    insert(&store, later).await;

    let starts: Vec<_> = store
        .list_user_bookings("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|b| (b.match_date.format("%d").to_string(), b.start_time))
        .collect();
    assert_eq!(
        starts,
        vec![
            ("21".to_string(), t(8, 0)),
            ("20".to_string(), t(18, 0)),
            ("20".to_string(), t(9, 0)),
        ]
    );
}

#[tokio::test]
async fn test_partner_directory_deduplicates() {
    let (_, store, _) = setup().await;
    let partners = [
        Partner::normalized("jean", "dupont"),
        Partner::normalized("marie", "curie"),
    ];

    store.upsert_partners("u1", &partners).await.unwrap();
    store.upsert_partners("u1", &partners[..1]).await.unwrap();

    let saved = store.list_partners("u1").await.unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].last_name, "CURIE");
    assert_eq!(saved[1].last_name, "DUPONT");
    assert!(store.list_partners("u2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let (_, _, profiles) = setup().await;

    assert!(profiles.get_profile("u1").await.unwrap().is_none());
    let created = profiles.ensure_profile("u1").await.unwrap();
    assert_eq!(created.user_id, "u1");
    assert!(!created.has_full_name());
    assert!(!created.has_club_credentials());

    let named = profiles.update_names("u1", "Jean", "DUPONT").await.unwrap();
    assert_eq!(named.first_name.as_deref(), Some("Jean"));
    assert_eq!(named.last_name.as_deref(), Some("DUPONT"));

    profiles
        .save_credentials(
            "u1",
            &ClubCredentials {
                club_id: "12345".to_string(),
                password: "secret".to_string(),
            },
        )
        .await
        .unwrap();

    let again = profiles.ensure_profile("u1").await.unwrap();
    assert!(again.has_full_name());
    assert!(again.has_club_credentials());
    assert_eq!(again.credentials.unwrap().password, "secret");
    assert_eq!(profiles.list_profiles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_roles_default_to_user() {
    let (_, _, profiles) = setup().await;

    assert_eq!(profiles.role_of("u1").await.unwrap(), Role::User);
    profiles.grant_role("u1", Role::Admin).await.unwrap();
    profiles.grant_role("u1", Role::Admin).await.unwrap();
    assert_eq!(profiles.role_of("u1").await.unwrap(), Role::Admin);
    assert_eq!(profiles.role_of("u2").await.unwrap(), Role::User);
}

#[tokio::test]
async fn test_profile_with_names_only_reads_back_null_credentials() {
    let (_, _, profiles) = setup().await;

    profiles.ensure_profile("u1").await.unwrap();
    profiles.update_names("u1", "Jean", "DUPONT").await.unwrap();

    let profile = profiles.get_profile("u1").await.unwrap().unwrap();
    assert!(profile.has_full_name());
    assert!(profile.credentials.is_none());
    assert!(!profile.has_club_credentials());

    let listed = profiles.list_profiles().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].credentials.is_none());
}

#[tokio::test]
async fn test_unreadable_created_at_is_a_decode_error() {
    let (db_client, store, _) = setup().await;
    let id = insert(&store, request("u1", Court::Padel1, t(18, 0), t(19, 30))).await;

    db_client
        .execute(&format!(
            "UPDATE bookings SET created_at = 'yesterday-ish' WHERE id = '{}'",
            id
        ))
        .await
        .unwrap();

    assert!(store.list_user_bookings("u1").await.is_err());
    assert!(store.list_all_bookings().await.is_err());
}

#[test]
fn test_backend_is_taken_from_url_scheme() {
    assert_eq!(Backend::from_url("sqlite::memory:"), Backend::Sqlite);
    assert_eq!(Backend::from_url("sqlite://data/padelbook.db"), Backend::Sqlite);
    assert_eq!(Backend::from_url("postgres://u:p@localhost/padel"), Backend::Postgres);
    assert_eq!(Backend::from_url("postgresql://localhost/padel"), Backend::Postgres);
    assert_eq!(Backend::from_url("mysql://localhost/padel"), Backend::Other);
}

#[tokio::test]
async fn test_memory_client_reports_sqlite_backend() {
    let (db_client, _, _) = setup().await;
    assert_eq!(db_client.backend(), Backend::Sqlite);
}

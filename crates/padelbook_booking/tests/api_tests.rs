use axum::http::{Method, StatusCode};
use padelbook_common::models::BookingStatus;
use padelbook_common::BookingStore;
use serde_json::json;

use fixtures::*;

#[tokio::test]
async fn test_requests_without_identity_are_rejected() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/bookings", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 401);

    let (status, _) = send(
        &app,
        request(Method::POST, "/bookings", None, Some(booking_json(CLOSED_DATE, 1, "18:00:00", None))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_reservation_window() {
    let (app, _) = create_test_app().await;

    let uri = format!("/reservation-window?date={}", CLOSED_DATE);
    let (status, body) = send(&app, request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match_date"], CLOSED_DATE);
    assert_eq!(body["opens_at"], "2025-06-17T06:00:00Z");
    assert_eq!(body["already_open"], false);
    assert_eq!(body["external_booking_url"], CLUB_URL);

    let uri = format!("/reservation-window?date={}", OPEN_DATE);
    let (_, body) = send(&app, request(Method::GET, &uri, None, None)).await;
    assert_eq!(body["already_open"], true);

    let (status, _) = send(
        &app,
        request(Method::GET, "/reservation-window?date=20-06-2025", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_courts() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/courts", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let courts = body.as_array().unwrap();
    assert_eq!(courts.len(), 3);
    assert_eq!(courts[0]["court"], 1);
    assert_eq!(courts[0]["external_id"], "1290");
    assert_eq!(courts[2]["slot_duration_minutes"], 60);
}

#[tokio::test]
async fn test_availability_disabled() {
    let (app, _) = create_test_app().await;
    let uri = format!("/availability?date={}&court=1", CLOSED_DATE);
    let (status, _) = send(&app, request(Method::GET, &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_create_booking_request() {
    let (app, _) = create_test_app().await;
    ready_member(&app, "u1").await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/bookings",
            Some("u1"),
            Some(booking_json(CLOSED_DATE, 2, "18:00:00", Some("19:30:00"))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["label"], "jdupont1");
    assert_eq!(body["booking"]["status"], "pending");
    assert_eq!(body["booking"]["court"], 2);
    assert_eq!(body["booking"]["reservation_opens_at"], "2025-06-17T06:00:00Z");
    assert_eq!(body["booking"]["partners"][0]["first_name"], "Paul");
    assert_eq!(body["booking"]["partners"][0]["last_name"], "MARTIN");

    let (status, body) = send(&app, request(Method::GET, "/bookings", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, request(Method::GET, "/partners", Some("u1"), None)).await;
    let partners = body.as_array().unwrap();
    assert_eq!(partners.len(), 3);
    assert_eq!(partners[0]["last_name"], "BERNARD");
}

#[tokio::test]
async fn test_end_time_defaults_to_match_length() {
    let (app, _) = create_test_app().await;
    ready_member(&app, "u1").await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/bookings",
            Some("u1"),
            Some(booking_json(CLOSED_DATE, 3, "20:00:00", None)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["end_time"], "21:00:00");

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/bookings",
            Some("u1"),
            Some(booking_json("2025-06-21", 1, "23:00:00", None)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_second_pending_request_is_refused() {
    let (app, store) = create_test_app().await;
    ready_member(&app, "u1").await;

    let first = booking_json(CLOSED_DATE, 1, "18:00:00", Some("19:30:00"));
    let (status, _) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(first))).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = booking_json(CLOSED_DATE, 2, "10:00:00", Some("11:30:00"));
    let (status, body) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(second))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 409);
    assert_eq!(store.list_all_bookings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_overlapping_request_is_refused() {
    let (app, store) = create_test_app().await;
    ready_member(&app, "u1").await;
    ready_member(&app, "u2").await;

    let taken = booking_json(CLOSED_DATE, 1, "18:00:00", Some("19:30:00"));
    let (status, _) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(taken))).await;
    assert_eq!(status, StatusCode::CREATED);

    let overlapping = booking_json(CLOSED_DATE, 1, "19:00:00", Some("20:30:00"));
    let (status, _) = send(&app, request(Method::POST, "/bookings", Some("u2"), Some(overlapping))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let adjacent = booking_json(CLOSED_DATE, 1, "19:30:00", Some("21:00:00"));
    let (status, _) = send(&app, request(Method::POST, "/bookings", Some("u2"), Some(adjacent))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.list_all_bookings().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_credentials_are_required_once() {
    let (app, _) = create_test_app().await;
    set_names(&app, "u1").await;

    let payload = booking_json(CLOSED_DATE, 1, "18:00:00", Some("19:30:00"));
    let (status, body) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(payload.clone()))).await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(body["error"]["code"], 428);

    let mut with_credentials = payload;
    with_credentials["credentials"] = json!({ "club_id": "12345", "password": "secret" });
    let (status, _) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(with_credentials))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, profile) = send(&app, request(Method::GET, "/profile", Some("u1"), None)).await;
    assert_eq!(profile["has_club_credentials"], true);
    assert_eq!(profile["club_id"], "12345");
    assert!(profile.get("password").is_none());
}

#[tokio::test]
async fn test_open_window_is_not_pre_booked() {
    let (app, store) = create_test_app().await;
    ready_member(&app, "u1").await;

    let payload = booking_json(OPEN_DATE, 1, "18:00:00", Some("19:30:00"));
    let (status, _) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(payload))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(store.list_all_bookings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_names_are_required() {
    let (app, _) = create_test_app().await;
    set_credentials(&app, "u1").await;

    let payload = booking_json(CLOSED_DATE, 1, "18:00:00", Some("19:30:00"));
    let (status, _) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(payload))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/profile",
            Some("u1"),
            Some(json!({ "first_name": " ", "last_name": "Dupont" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_profile() {
    let (app, _) = create_test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/profile", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["email"], "u1@example.com");
    assert_eq!(body["role"], "user");
    assert_eq!(body["has_club_credentials"], false);

    set_names(&app, "u1").await;
    let (_, body) = send(&app, request(Method::GET, "/profile", Some("u1"), None)).await;
    assert_eq!(body["first_name"], "Jean");
    assert_eq!(body["last_name"], "Dupont");
}

#[tokio::test]
async fn test_cancel_pending_request() {
    let (app, store) = create_test_app().await;
    ready_member(&app, "u1").await;

    let payload = booking_json(CLOSED_DATE, 1, "18:00:00", Some("19:30:00"));
    let (_, body) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(payload))).await;
    let id = body["booking"]["id"].as_str().unwrap().to_string();
    let uri = format!("/bookings/{}", id);

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some("u2"), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(store.list_all_bookings().await.unwrap().is_empty());

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_confirmed_request_cannot_be_cancelled() {
    let (app, store) = create_test_app().await;
    ready_member(&app, "u1").await;

    let payload = booking_json(CLOSED_DATE, 1, "18:00:00", Some("19:30:00"));
    let (_, body) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(payload))).await;
    let id = body["booking"]["id"].as_str().unwrap().to_string();
    assert!(store.set_status(&id, BookingStatus::Confirmed).await);

    let (status, _) = send(&app, request(Method::DELETE, &format!("/bookings/{}", id), Some("u1"), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_routes() {
    let (app, _) = create_test_app().await;
    ready_member(&app, "u1").await;
    let payload = booking_json(CLOSED_DATE, 1, "18:00:00", Some("19:30:00"));
    let (_, body) = send(&app, request(Method::POST, "/bookings", Some("u1"), Some(payload))).await;
    let id = body["booking"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, request(Method::GET, "/admin/bookings", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request(Method::GET, "/admin/bookings", Some(ADMIN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, request(Method::GET, "/admin/profiles", Some(ADMIN), None)).await;
    assert_eq!(status, StatusCode::OK);
    let profiles = body.as_array().unwrap();
    let member = profiles.iter().find(|p| p["user_id"] == "u1").unwrap();
    assert_eq!(member["club_id"], "12345");
    assert_eq!(member["has_club_credentials"], true);
    assert!(!body.to_string().contains("secret"));

    let uri = format!("/admin/bookings/{}", id);
    let (status, _) = send(&app, request(Method::DELETE, &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(ADMIN), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

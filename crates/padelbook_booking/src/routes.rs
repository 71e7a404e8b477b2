use axum::{
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    admin_cancel_booking_handler, admin_list_bookings_handler, admin_list_profiles_handler,
    cancel_booking_handler, create_booking_handler, get_availability_handler, get_courts_handler,
    get_profile_handler, get_reservation_window_handler, list_bookings_handler,
    list_partners_handler, update_credentials_handler, update_profile_handler, BookingState,
};

/// Creates a router containing all booking, profile and admin routes.
/// Paths are relative; the backend nests them under `/api`.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/reservation-window", get(get_reservation_window_handler))
        .route("/courts", get(get_courts_handler))
        .route("/availability", get(get_availability_handler))
        .route(
            "/bookings",
            get(list_bookings_handler).post(create_booking_handler),
        )
        .route("/bookings/{id}", delete(cancel_booking_handler))
        .route(
            "/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route("/profile/credentials", put(update_credentials_handler))
        .route("/partners", get(list_partners_handler))
        .route("/admin/bookings", get(admin_list_bookings_handler))
        .route("/admin/bookings/{id}", delete(admin_cancel_booking_handler))
        .route("/admin/profiles", get(admin_list_profiles_handler))
        .with_state(state)
}

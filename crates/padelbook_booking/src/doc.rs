#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::courts::CourtSlot;
use crate::handlers::{
    AdminProfileView, AvailabilityQuery, AvailabilityResponse, CreateBookingRequest,
    ProfileResponse, ReservationWindowResponse, SlotView, UpdateProfileRequest, WindowQuery,
};
use crate::workflow::SubmissionReceipt;
use padelbook_common::models::{
    AvailableSlot, BookingRequest, BookingStatus, ClubCredentials, Partner, SavedPartner,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_reservation_window_handler,
        crate::handlers::get_courts_handler,
        crate::handlers::get_availability_handler,
        crate::handlers::list_bookings_handler,
        crate::handlers::create_booking_handler,
        crate::handlers::cancel_booking_handler,
        crate::handlers::get_profile_handler,
        crate::handlers::update_profile_handler,
        crate::handlers::update_credentials_handler,
        crate::handlers::list_partners_handler,
        crate::handlers::admin_list_bookings_handler,
        crate::handlers::admin_cancel_booking_handler,
        crate::handlers::admin_list_profiles_handler,
    ),
    components(
        schemas(
            WindowQuery,
            ReservationWindowResponse,
            CourtSlot,
            AvailabilityQuery,
            AvailabilityResponse,
            SlotView,
            AvailableSlot,
            CreateBookingRequest,
            SubmissionReceipt,
            BookingRequest,
            BookingStatus,
            Partner,
            SavedPartner,
            ClubCredentials,
            ProfileResponse,
            UpdateProfileRequest,
            AdminProfileView,
        )
    ),
    tags(
        (name = "Booking", description = "Pre-booking requests for padel courts"),
        (name = "Profile", description = "Member profile and club credentials"),
        (name = "Admin", description = "Administration of all requests and profiles")
    )
)]
pub struct BookingApiDoc;

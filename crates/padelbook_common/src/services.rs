// --- File: crates/padelbook_common/src/services.rs ---
//! Store abstractions.
//!
//! The booking workflow and the HTTP handlers only talk to these traits, so
//! the SQL implementation in `padelbook-db` can be swapped for an in-memory
//! one in tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::models::{
    BookingRequest, ClubCredentials, Court, NewBookingRequest, Partner, Profile, Role,
    SavedPartner, TimeRange,
};

/// Result of the atomic conflict-check-and-insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(BookingRequest),
    /// A pending or confirmed request already holds an overlapping slot; nothing was written.
    Conflict,
}

/// Booking requests and the partner directory.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// The user's requests, most recent match first (date then start time, descending).
    async fn list_user_bookings(&self, user_id: &str) -> Result<Vec<BookingRequest>, StoreError>;

    /// Every request, most recent match first.
    async fn list_all_bookings(&self) -> Result<Vec<BookingRequest>, StoreError>;

    /// Whether a pending or confirmed request overlaps `range` on `court` and `match_date`.
    async fn has_conflict(
        &self,
        court: Court,
        match_date: NaiveDate,
        range: TimeRange,
    ) -> Result<bool, StoreError>;

    /// Inserts the request unless it conflicts, as one atomic operation.
    ///
    /// Two overlapping calls racing each other can never both return `Inserted`.
    async fn insert_if_no_conflict(
        &self,
        request: NewBookingRequest,
    ) -> Result<InsertOutcome, StoreError>;

    /// Deletes `booking_id` if it belongs to `owner` and is still pending.
    /// Returns whether a row was deleted.
    async fn cancel_pending(&self, booking_id: &str, owner: &str) -> Result<bool, StoreError>;

    /// Deletes `booking_id` whoever owns it, if it is still pending.
    async fn cancel_pending_any(&self, booking_id: &str) -> Result<bool, StoreError>;

    /// Adds the partners to the user's directory, ignoring ones already known.
    async fn upsert_partners(&self, user_id: &str, partners: &[Partner]) -> Result<(), StoreError>;

    async fn list_partners(&self, user_id: &str) -> Result<Vec<SavedPartner>, StoreError>;
}

/// Member profiles and roles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the profile, creating an empty one on first sight of the user.
    async fn ensure_profile(&self, user_id: &str) -> Result<Profile, StoreError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    async fn update_names(
        &self,
        user_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Profile, StoreError>;

    async fn save_credentials(
        &self,
        user_id: &str,
        credentials: &ClubCredentials,
    ) -> Result<(), StoreError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// `Role::User` unless the user has an admin row.
    async fn role_of(&self, user_id: &str) -> Result<Role, StoreError>;
}

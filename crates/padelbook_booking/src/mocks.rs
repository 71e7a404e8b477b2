//! Mock stores for failure injection in unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use padelbook_common::models::{
    BookingRequest, ClubCredentials, Court, NewBookingRequest, Partner, Profile, Role,
    SavedPartner, TimeRange,
};
use padelbook_common::{BookingStore, InsertOutcome, ProfileStore, StoreError};

mock! {
    pub Bookings {}

    #[async_trait]
    impl BookingStore for Bookings {
        async fn list_user_bookings(&self, user_id: &str) -> Result<Vec<BookingRequest>, StoreError>;
        async fn list_all_bookings(&self) -> Result<Vec<BookingRequest>, StoreError>;
        async fn has_conflict(
            &self,
            court: Court,
            match_date: NaiveDate,
            range: TimeRange,
        ) -> Result<bool, StoreError>;
        async fn insert_if_no_conflict(
            &self,
            request: NewBookingRequest,
        ) -> Result<InsertOutcome, StoreError>;
        async fn cancel_pending(&self, booking_id: &str, owner: &str) -> Result<bool, StoreError>;
        async fn cancel_pending_any(&self, booking_id: &str) -> Result<bool, StoreError>;
        async fn upsert_partners(&self, user_id: &str, partners: &[Partner]) -> Result<(), StoreError>;
        async fn list_partners(&self, user_id: &str) -> Result<Vec<SavedPartner>, StoreError>;
    }
}

mock! {
    pub Profiles {}

    #[async_trait]
    impl ProfileStore for Profiles {
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
        async fn role_of(&self, user_id: &str) -> Result<Role, StoreError>;
    }
}

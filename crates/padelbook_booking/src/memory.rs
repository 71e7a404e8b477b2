//! In-process stores.
//!
//! Used when no database is configured, and by the tests. One mutex guards
//! all state, so check-and-insert is atomic just like the SQL version.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use padelbook_common::models::{
    BookingRequest, BookingStatus, ClubCredentials, Court, NewBookingRequest, Partner, Profile,
    Role, SavedPartner, TimeRange,
};
use padelbook_common::{BookingStore, InsertOutcome, ProfileStore, StoreError};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::conflict::find_blocking;

#[derive(Debug, Default)]
struct State {
    bookings: Vec<BookingRequest>,
    partners: Vec<SavedPartner>,
    profiles: BTreeMap<String, Profile>,
    admins: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

fn most_recent_first(bookings: &mut [BookingRequest]) {
    bookings.sort_by(|a, b| {
        b.match_date
            .cmp(&a.match_date)
            .then(b.start_time.cmp(&a.start_time))
    });
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn grant_role(&self, user_id: &str, role: Role) {
        let mut state = self.state.lock().await;
        match role {
            Role::Admin => state.admins.insert(user_id.to_string()),
            Role::User => state.admins.remove(user_id),
        };
    }

    /// Records the outcome reported by the booking agent.
    pub async fn set_status(&self, booking_id: &str, status: BookingStatus) -> bool {
        let mut state = self.state.lock().await;
        match state.bookings.iter_mut().find(|b| b.id == booking_id) {
            Some(booking) => {
                booking.status = status;
                true
            }
            None => false,
        }
    }

    async fn remove_pending<F>(&self, booking_id: &str, allowed: F) -> bool
    where
        F: Fn(&BookingRequest) -> bool + Send,
    {
        let mut state = self.state.lock().await;
        let before = state.bookings.len();
        state.bookings.retain(|b| {
            !(b.id == booking_id && b.status == BookingStatus::Pending && allowed(b))
        });
        state.bookings.len() != before
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn list_user_bookings(&self, user_id: &str) -> Result<Vec<BookingRequest>, StoreError> {
        let state = self.state.lock().await;
        let mut bookings: Vec<_> = state
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        most_recent_first(&mut bookings);
        Ok(bookings)
    }

    async fn list_all_bookings(&self) -> Result<Vec<BookingRequest>, StoreError> {
        let mut bookings = self.state.lock().await.bookings.clone();
        most_recent_first(&mut bookings);
        Ok(bookings)
    }

    async fn has_conflict(
        &self,
        court: Court,
        match_date: NaiveDate,
        range: TimeRange,
    ) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(find_blocking(&state.bookings, court, match_date, &range).is_some())
    }

    async fn insert_if_no_conflict(
        &self,
        request: NewBookingRequest,
    ) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.lock().await;
        if find_blocking(
            &state.bookings,
            request.court,
            request.match_date,
            &request.time_range,
        )
        .is_some()
        {
            return Ok(InsertOutcome::Conflict);
        }

        let booking = BookingRequest {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            court: request.court,
            match_date: request.match_date,
            start_time: request.time_range.start,
            end_time: request.time_range.end,
            partners: request.partners,
            status: BookingStatus::Pending,
            reservation_opens_at: request.reservation_opens_at,
            created_at: Some(Utc::now()),
        };
        state.bookings.push(booking.clone());
        Ok(InsertOutcome::Inserted(booking))
    }

    async fn cancel_pending(&self, booking_id: &str, owner: &str) -> Result<bool, StoreError> {
        Ok(self.remove_pending(booking_id, |b| b.user_id == owner).await)
    }

    async fn cancel_pending_any(&self, booking_id: &str) -> Result<bool, StoreError> {
        Ok(self.remove_pending(booking_id, |_| true).await)
    }

    async fn upsert_partners(&self, user_id: &str, partners: &[Partner]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        for partner in partners {
            let known = state.partners.iter().any(|p| {
                p.user_id == user_id
                    && p.first_name == partner.first_name
                    && p.last_name == partner.last_name
            });
            if !known {
                state.partners.push(SavedPartner {
                    user_id: user_id.to_string(),
                    first_name: partner.first_name.clone(),
                    last_name: partner.last_name.clone(),
                });
            }
        }
        Ok(())
    }

    async fn list_partners(&self, user_id: &str) -> Result<Vec<SavedPartner>, StoreError> {
        let state = self.state.lock().await;
        let mut partners: Vec<_> = state
            .partners
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        partners.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then(a.first_name.cmp(&b.first_name))
        });
        Ok(partners)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn ensure_profile(&self, user_id: &str) -> Result<Profile, StoreError> {
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Profile {
                updated_at: Some(Utc::now()),
                ..Profile::empty(user_id)
            });
        Ok(profile.clone())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.state.lock().await.profiles.get(user_id).cloned())
    }

    async fn update_names(
        &self,
        user_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Profile, StoreError> {
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Profile::empty(user_id));
        profile.first_name = Some(first_name.to_string());
        profile.last_name = Some(last_name.to_string());
        profile.updated_at = Some(Utc::now());
        Ok(profile.clone())
    }

    async fn save_credentials(
        &self,
        user_id: &str,
        credentials: &ClubCredentials,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Profile::empty(user_id));
        profile.credentials = Some(credentials.clone());
        profile.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.state.lock().await.profiles.values().cloned().collect())
    }

    async fn role_of(&self, user_id: &str) -> Result<Role, StoreError> {
        let state = self.state.lock().await;
        Ok(if state.admins.contains(user_id) {
            Role::Admin
        } else {
            Role::User
        })
    }
}

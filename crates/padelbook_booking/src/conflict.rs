//! Slot conflict detection.
//!
//! A request blocks a slot when it is on the same court and date, its time
//! range overlaps, and it is pending or confirmed. Failed requests never block.

use chrono::NaiveDate;
use padelbook_common::models::{BookingRequest, Court, NewBookingRequest, TimeRange};
use padelbook_common::{BookingStore, InsertOutcome};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::BookingError;

#[derive(Clone)]
pub struct ConflictChecker {
    store: Arc<dyn BookingStore>,
}

impl ConflictChecker {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Asks the store whether the slot is taken. A store failure is an error,
    /// never "free".
    pub async fn check_conflict(
        &self,
        court: Court,
        match_date: NaiveDate,
        range: TimeRange,
    ) -> Result<bool, BookingError> {
        let taken = self
            .store
            .has_conflict(court, match_date, range)
            .await
            .map_err(|e| {
                warn!("Conflict check failed for {} on {}: {}", court, match_date, e);
                BookingError::Storage(e)
            })?;
        debug!(
            "Conflict check for {} on {} {}-{}: {}",
            court, match_date, range.start, range.end, taken
        );
        Ok(taken)
    }

    /// Stores the request unless the slot is taken, in one atomic step.
    pub async fn insert_if_free(
        &self,
        request: NewBookingRequest,
    ) -> Result<BookingRequest, BookingError> {
        match self.store.insert_if_no_conflict(request).await? {
            InsertOutcome::Inserted(booking) => Ok(booking),
            InsertOutcome::Conflict => Err(BookingError::Conflict),
        }
    }
}

/// First request in `bookings` that blocks the slot.
pub fn find_blocking<'a>(
    bookings: &'a [BookingRequest],
    court: Court,
    match_date: NaiveDate,
    range: &TimeRange,
) -> Option<&'a BookingRequest> {
    bookings.iter().find(|b| b.blocks(court, match_date, range))
}

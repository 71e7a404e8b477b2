//! Court table: external identifiers and match lengths per court.

use chrono::{Duration, NaiveTime};
use padelbook_common::models::Court;
use padelbook_config::CourtConfig;
use serde::Serialize;

use crate::error::BookingError;

const FALLBACK_SLOT_MINUTES: i64 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CourtSlot {
    #[cfg_attr(feature = "openapi", schema(value_type = u8))]
    pub court: Court,
    pub external_id: Option<String>,
    pub slot_duration_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtSchedule {
    slots: Vec<CourtSlot>,
}

impl CourtSchedule {
    pub fn from_config(courts: &[CourtConfig]) -> Result<Self, BookingError> {
        let mut slots = Vec::with_capacity(courts.len());
        for entry in courts {
            let court = Court::try_from(entry.number)
                .map_err(|e| BookingError::Config(e.to_string()))?;
            if entry.slot_duration_minutes <= 0 {
                return Err(BookingError::Config(format!(
                    "slot duration for {} must be positive",
                    court
                )));
            }
            if slots.iter().any(|s: &CourtSlot| s.court == court) {
                return Err(BookingError::Config(format!("{} is listed twice", court)));
            }
            slots.push(CourtSlot {
                court,
                external_id: entry.external_id.clone(),
                slot_duration_minutes: entry.slot_duration_minutes,
            });
        }
        slots.sort_by_key(|s| s.court.number());
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[CourtSlot] {
        &self.slots
    }

    fn slot(&self, court: Court) -> Option<&CourtSlot> {
        self.slots.iter().find(|s| s.court == court)
    }

    pub fn external_id(&self, court: Court) -> Option<&str> {
        self.slot(court).and_then(|s| s.external_id.as_deref())
    }

    pub fn slot_duration(&self, court: Court) -> Duration {
        Duration::minutes(
            self.slot(court)
                .map(|s| s.slot_duration_minutes)
                .unwrap_or(FALLBACK_SLOT_MINUTES),
        )
    }

    /// End of a match starting at `start`, or `None` when it would run past midnight.
    pub fn suggested_end_time(&self, court: Court, start: NaiveTime) -> Option<NaiveTime> {
        let (end, wrapped) = start.overflowing_add_signed(self.slot_duration(court));
        (wrapped == 0 && end != NaiveTime::MIN).then_some(end)
    }
}

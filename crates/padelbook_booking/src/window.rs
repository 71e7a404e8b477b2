//! The club's own booking window.
//!
//! The club opens bookings for a match date `D` at 08:00 local time, three
//! days before `D`. Pre-booking requests only make sense while that window
//! is still closed; once it is open, members book directly on the club site.

use chrono::{
    DateTime, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::BookingError;

pub const DEFAULT_DAYS_BEFORE: u32 = 3;
pub const DEFAULT_OPENING_HOUR: u32 = 8;

/// When the club opens bookings relative to the match date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationWindowRule {
    pub days_before: u32,
    pub opening_time: NaiveTime,
}

impl Default for ReservationWindowRule {
    fn default() -> Self {
        Self {
            days_before: DEFAULT_DAYS_BEFORE,
            opening_time: NaiveTime::from_hms_opt(DEFAULT_OPENING_HOUR, 0, 0).unwrap_or_default(),
        }
    }
}

impl ReservationWindowRule {
    pub fn new(days_before: i64, opening_hour: u32) -> Result<Self, BookingError> {
        let days_before = u32::try_from(days_before)
            .ok()
            .filter(|d| *d <= 365)
            .ok_or_else(|| {
                BookingError::Config(format!(
                    "days_before must be within 0..=365, got {}",
                    days_before
                ))
            })?;
        let opening_time = NaiveTime::from_hms_opt(opening_hour, 0, 0).ok_or_else(|| {
            BookingError::Config(format!(
                "opening_hour must be within 0..=23, got {}",
                opening_hour
            ))
        })?;
        Ok(Self {
            days_before,
            opening_time,
        })
    }

    /// Local wall-clock instant at which bookings for `match_date` open.
    ///
    /// Days are subtracted on the calendar before the time is set, so the
    /// result is always at `opening_time` whatever DST does in between.
    pub fn opens_at_local(&self, match_date: NaiveDate) -> NaiveDateTime {
        // saturates at the earliest representable date
        let day = match_date
            .checked_sub_days(Days::new(u64::from(self.days_before)))
            .unwrap_or(NaiveDate::MIN);
        day.and_time(self.opening_time)
    }

    /// The opening instant, resolved in the club's time zone.
    pub fn opens_at(&self, match_date: NaiveDate, tz: Tz) -> DateTime<Utc> {
        resolve_local(tz, self.opens_at_local(match_date))
    }

    /// True once the club's window for `match_date` has opened. At the exact
    /// opening instant the window is still considered closed.
    pub fn is_window_already_open(
        &self,
        match_date: NaiveDate,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> bool {
        self.opens_at(match_date, tz) < now
    }

    pub fn window(&self, match_date: NaiveDate, now: DateTime<Utc>, tz: Tz) -> ReservationWindow {
        let opens_at = self.opens_at(match_date, tz);
        ReservationWindow {
            match_date,
            opens_at,
            already_open: opens_at < now,
        }
    }
}

/// Computed window for one match date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReservationWindow {
    pub match_date: NaiveDate,
    pub opens_at: DateTime<Utc>,
    pub already_open: bool,
}

/// Ambiguous wall-clock times take the earlier instant. Times skipped by a
/// DST jump move forward to the first instant that exists after the gap.
fn resolve_local(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let mut candidate = local;
            // gaps never exceed a day
            for _ in 0..24 * 60 {
                candidate += Duration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
                    return dt.with_timezone(&Utc);
                }
            }
            Utc.from_utc_datetime(&local)
        }
    }
}

/// Local opening time for `match_date` with the club's default rule
/// (three days before, 08:00).
pub fn reservation_opens_at(match_date: NaiveDate) -> NaiveDateTime {
    ReservationWindowRule::default().opens_at_local(match_date)
}

/// [`ReservationWindowRule::is_window_already_open`] with the default rule.
pub fn is_window_already_open(match_date: NaiveDate, now: DateTime<Utc>, tz: Tz) -> bool {
    ReservationWindowRule::default().is_window_already_open(match_date, now, tz)
}

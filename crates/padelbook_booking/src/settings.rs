use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use padelbook_config::BookingConfig;
use std::fmt::Debug;
use std::sync::Arc;

use crate::courts::CourtSchedule;
use crate::error::BookingError;
use crate::window::{ReservationWindow, ReservationWindowRule};

/// Source of the current instant.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Club rules the workflow runs against.
#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub rule: ReservationWindowRule,
    pub time_zone: Tz,
    pub external_booking_url: Option<String>,
    pub courts: CourtSchedule,
    pub clock: Arc<dyn Clock>,
}

impl BookingSettings {
    pub fn from_config(config: &BookingConfig) -> Result<Self, BookingError> {
        let time_zone = config.time_zone.parse::<Tz>().map_err(|e| {
            BookingError::Config(format!("invalid time zone '{}': {}", config.time_zone, e))
        })?;

        Ok(Self {
            rule: ReservationWindowRule::new(config.days_before, config.opening_hour)?,
            time_zone,
            external_booking_url: config.external_booking_url.clone(),
            courts: CourtSchedule::from_config(&config.courts)?,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Today's date on the club's calendar.
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.time_zone).date_naive()
    }

    pub fn window(&self, match_date: NaiveDate) -> ReservationWindow {
        self.rule.window(match_date, self.now(), self.time_zone)
    }
}

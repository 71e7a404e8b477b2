// --- File: crates/padelbook_common/src/models.rs ---
//! Domain model shared by the store implementations, the booking workflow and
//! the HTTP layer.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error raised when a stored or submitted value does not map onto the model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown court: {0}")]
    UnknownCourt(String),
    #[error("unknown booking status: {0}")]
    UnknownStatus(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("end time {end} must be after start time {start}")]
    EmptyTimeRange { start: NaiveTime, end: NaiveTime },
}

// --- Courts ---

/// The club's padel courts. Serialized as their number (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Court {
    Padel1,
    Padel2,
    Padel3,
}

impl Court {
    pub const ALL: [Court; 3] = [Court::Padel1, Court::Padel2, Court::Padel3];

    pub fn number(self) -> u8 {
        match self {
            Court::Padel1 => 1,
            Court::Padel2 => 2,
            Court::Padel3 => 3,
        }
    }
}

impl TryFrom<u8> for Court {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Court::Padel1),
            2 => Ok(Court::Padel2),
            3 => Ok(Court::Padel3),
            other => Err(ModelError::UnknownCourt(other.to_string())),
        }
    }
}

impl From<Court> for u8 {
    fn from(court: Court) -> Self {
        court.number()
    }
}

impl fmt::Display for Court {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Padel {}", self.number())
    }
}

// --- Booking status ---

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Failed => "failed",
        }
    }

    /// Failed requests free their slot; pending and confirmed ones hold it.
    pub fn holds_slot(self) -> bool {
        !matches!(self, BookingStatus::Failed)
    }
}

impl FromStr for BookingStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "failed" => Ok(BookingStatus::Failed),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Time ranges ---

/// Half-open time-of-day range `[start, end)` on a single match date.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ModelError> {
        if end <= start {
            return Err(ModelError::EmptyTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Two ranges overlap iff `a.start < b.end && b.start < a.end`.
    /// Back-to-back ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

// --- Partners ---

/// One of the three co-players of a match.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partner {
    pub first_name: String,
    pub last_name: String,
}

impl Partner {
    /// Builds a partner with the club's spelling: given name capitalized,
    /// surname upper-cased, both trimmed.
    pub fn normalized(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: capitalize_first(first_name.trim()),
            last_name: last_name.trim().to_uppercase(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A partner remembered in the user's partner directory.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPartner {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
}

// --- Booking requests ---

/// A member's request to occupy a court, waiting to be placed on the club's
/// own system once its booking window opens.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: String,
    pub user_id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = u8, example = 1))]
    pub court: Court,
    pub match_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Partner>))]
    pub partners: [Partner; 3],
    pub status: BookingStatus,
    pub reservation_opens_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl BookingRequest {
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Whether this request prevents another one for `court` on `match_date`
    /// during `range`.
    pub fn blocks(&self, court: Court, match_date: NaiveDate, range: &TimeRange) -> bool {
        self.status.holds_slot()
            && self.court == court
            && self.match_date == match_date
            && self.time_range().overlaps(range)
    }
}

/// Payload of a booking request before the store assigns id, status and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBookingRequest {
    pub user_id: String,
    pub court: Court,
    pub match_date: NaiveDate,
    pub time_range: TimeRange,
    pub partners: [Partner; 3],
    pub reservation_opens_at: DateTime<Utc>,
}

// --- Profiles, roles and sessions ---

/// Login for the club's booking site, used by the automation agent to place
/// the real booking on the member's behalf.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubCredentials {
    pub club_id: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl ClubCredentials {
    pub fn is_complete(&self) -> bool {
        !self.club_id.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for ClubCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClubCredentials")
            .field("club_id", &self.club_id)
            .field("password", &"***")
            .finish()
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub credentials: Option<ClubCredentials>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            first_name: None,
            last_name: None,
            credentials: None,
            updated_at: None,
        }
    }

    pub fn has_club_credentials(&self) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(ClubCredentials::is_complete)
    }

    pub fn has_full_name(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.first_name) && filled(&self.last_name)
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(ModelError::UnknownRole(other.to_string())),
        }
    }
}

/// Identity handed over by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
}

/// Everything the booking workflow needs to know about who is booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: CurrentUser,
    pub profile: Profile,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// --- Availability ---

/// A slot as published by the automation backend's availability webhook.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub court_id: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}

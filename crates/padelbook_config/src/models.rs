// --- File: crates/padelbook_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite:data/padelbook.db", overridable via PADELBOOK__DATABASE__URL
}

// --- Court table ---
/// One bookable court of the club.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CourtConfig {
    /// Court number as shown to members (1..=3).
    pub number: u8,
    /// Identifier of the court in the club's own system, used to filter availability.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Length of one match on this court.
    #[serde(default = "default_slot_duration")]
    pub slot_duration_minutes: i64,
}

fn default_slot_duration() -> i64 {
    90
}

fn default_courts() -> Vec<CourtConfig> {
    vec![
        CourtConfig {
            number: 1,
            external_id: Some("1290".to_string()),
            slot_duration_minutes: 90,
        },
        CourtConfig {
            number: 2,
            external_id: Some("1291".to_string()),
            slot_duration_minutes: 90,
        },
        CourtConfig {
            number: 3,
            external_id: Some("1669".to_string()),
            slot_duration_minutes: 60,
        },
    ]
}

// --- Booking rules ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// IANA time zone of the club, e.g. "Europe/Paris".
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// How many days before the match the club opens its own booking window.
    #[serde(default = "default_days_before")]
    pub days_before: i64,
    /// Local hour at which the club's booking window opens.
    #[serde(default = "default_opening_hour")]
    pub opening_hour: u32,
    /// Where members are sent when the window is already open.
    #[serde(default)]
    pub external_booking_url: Option<String>,
    #[serde(default = "default_courts")]
    pub courts: Vec<CourtConfig>,
}

fn default_time_zone() -> String {
    "Europe/Paris".to_string()
}

fn default_days_before() -> i64 {
    3
}

fn default_opening_hour() -> u32 {
    8
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            days_before: default_days_before(),
            opening_hour: default_opening_hour(),
            external_booking_url: None,
            courts: default_courts(),
        }
    }
}

// --- Availability webhook ---
// Slots are published by the automation backend, this service only reads them.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AvailabilityConfig {
    pub webhook_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_availability: bool,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub availability: Option<AvailabilityConfig>,

    /// User ids granted the admin role at startup.
    #[serde(default)]
    pub admins: Vec<String>,
}

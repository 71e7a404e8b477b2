//! Row mapping for the `bookings` table
//!
//! Dates, times and instants are stored as text (`YYYY-MM-DD`, `HH:MM:SS`,
//! RFC 3339) because the `Any` driver cannot decode chrono types, and because
//! these formats sort lexicographically in chronological order, which the
//! overlap condition relies on.

use crate::error::DbError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use padelbook_common::models::{BookingRequest, BookingStatus, Court, Partner};
use sqlx::any::AnyRow;
use sqlx::Row;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";

pub(crate) const CREATE_BOOKINGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        court_number INTEGER NOT NULL CHECK (court_number BETWEEN 1 AND 3),
        match_date TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        partner_1_first_name TEXT NOT NULL,
        partner_1_last_name TEXT NOT NULL,
        partner_2_first_name TEXT NOT NULL,
        partner_2_last_name TEXT NOT NULL,
        partner_3_first_name TEXT NOT NULL,
        partner_3_last_name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'confirmed', 'failed')),
        reservation_opens_at TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
"#;

pub(crate) const CREATE_BOOKINGS_SLOT_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS bookings_slot_idx
    ON bookings (court_number, match_date, status)
"#;

pub(crate) const CREATE_PARTNERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS partenaires (
        user_id TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        UNIQUE (user_id, first_name, last_name)
    )
"#;

pub(crate) const BOOKING_COLUMNS: &str = "id, user_id, court_number, match_date, start_time, end_time, \
     partner_1_first_name, partner_1_last_name, partner_2_first_name, partner_2_last_name, \
     partner_3_first_name, partner_3_last_name, status, reservation_opens_at, created_at";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn text(row: &AnyRow, column: &str) -> Result<String, DbError> {
    row.try_get::<String, _>(column)
        .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}

fn decode<T, E: std::fmt::Display>(column: &str, value: Result<T, E>) -> Result<T, DbError> {
    value.map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}

fn partner(row: &AnyRow, n: u8) -> Result<Partner, DbError> {
    Ok(Partner {
        first_name: text(row, &format!("partner_{}_first_name", n))?,
        last_name: text(row, &format!("partner_{}_last_name", n))?,
    })
}

/// Maps a `bookings` row selected with [`BOOKING_COLUMNS`].
pub(crate) fn booking_from_row(row: &AnyRow) -> Result<BookingRequest, DbError> {
    let court_number = row
        .try_get::<i64, _>("court_number")
        .map_err(|e| DbError::DecodeError(format!("court_number: {}", e)))?;
    let court = decode(
        "court_number",
        u8::try_from(court_number)
            .map_err(|e| e.to_string())
            .and_then(|n| Court::try_from(n).map_err(|e| e.to_string())),
    )?;

    let match_date = decode(
        "match_date",
        NaiveDate::parse_from_str(&text(row, "match_date")?, DATE_FORMAT),
    )?;
    let start_time = decode(
        "start_time",
        NaiveTime::parse_from_str(&text(row, "start_time")?, TIME_FORMAT),
    )?;
    let end_time = decode(
        "end_time",
        NaiveTime::parse_from_str(&text(row, "end_time")?, TIME_FORMAT),
    )?;
    let status = decode("status", text(row, "status")?.parse::<BookingStatus>())?;
    let reservation_opens_at = decode(
        "reservation_opens_at",
        DateTime::parse_from_rfc3339(&text(row, "reservation_opens_at")?),
    )?
    .with_timezone(&Utc);
    let created_at = decode(
        "created_at",
        DateTime::parse_from_rfc3339(&text(row, "created_at")?),
    )?
    .with_timezone(&Utc);

    Ok(BookingRequest {
        id: text(row, "id")?,
        user_id: text(row, "user_id")?,
        court,
        match_date,
        start_time,
        end_time,
        partners: [partner(row, 1)?, partner(row, 2)?, partner(row, 3)?],
        status,
        reservation_opens_at,
        created_at: Some(created_at),
    })
}

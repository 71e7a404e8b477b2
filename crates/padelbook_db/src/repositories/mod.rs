//! Repository modules for database access
//!
//! Each `*_sql` module implements one of the store traits from
//! `padelbook-common` on top of [`DbClient`](crate::DbClient).

mod booking;
pub mod booking_sql;
pub mod profile_sql;

pub use booking_sql::SqlBookingRepository;
pub use profile_sql::SqlProfileRepository;

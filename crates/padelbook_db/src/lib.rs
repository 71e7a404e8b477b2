//! Database integration for Padelbook
//!
//! This crate stores booking requests, saved partners, member profiles and
//! roles. It talks to the database through SQLx's `Any` driver, so the same
//! code runs against SQLite and PostgreSQL depending on the enabled features
//! and the configured URL.
//!
//! # Example
//!
//! ```rust,no_run
//! use padelbook_db::{DbClient, SqlBookingRepository, SqlProfileRepository};
//!
//! async fn setup_db() -> Result<(), Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite::memory:").await?;
//!     SqlBookingRepository::new(db_client.clone()).init_schema().await?;
//!     SqlProfileRepository::new(db_client).init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::{Backend, DbClient, DbTransaction};
pub use error::DbError;
pub use repositories::{SqlBookingRepository, SqlProfileRepository};

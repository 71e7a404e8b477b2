// --- File: crates/services/padelbook_backend/src/stores.rs ---
use padelbook_booking::memory::InMemoryStore;
use padelbook_common::logging::log_result;
use padelbook_common::models::Role;
use padelbook_common::{BookingStore, ProfileStore};
use padelbook_config::AppConfig;
use padelbook_db::{DbClient, DbError, SqlBookingRepository, SqlProfileRepository};
use std::sync::Arc;
use tracing::{info, warn};

/// The stores the booking routes run on.
pub struct Stores {
    pub bookings: Arc<dyn BookingStore>,
    pub profiles: Arc<dyn ProfileStore>,
}

/// Opens the configured database, or falls back to in-process stores when
/// none is configured. Users listed in `admins` get the admin role either way.
pub async fn build_stores(config: &AppConfig) -> Result<Stores, DbError> {
    if config.database.is_none() {
        warn!("No database configured, booking requests are kept in memory only");
        let store = Arc::new(InMemoryStore::new());
        for admin in &config.admins {
            store.grant_role(admin, Role::Admin).await;
        }
        return Ok(Stores {
            bookings: store.clone(),
            profiles: store,
        });
    }

    let db_client = log_result(
        DbClient::new(config).await,
        "Database connection established",
        "Failed to connect to the database",
    )?;
    if !db_client.is_healthy().await {
        warn!("Database connection opened but a test query failed");
    }

    let bookings = SqlBookingRepository::new(db_client.clone());
    log_result(
        bookings.init_schema().await,
        "Booking tables ready",
        "Failed to create booking tables",
    )?;
    let profiles = SqlProfileRepository::new(db_client);
    log_result(
        profiles.init_schema().await,
        "Profile tables ready",
        "Failed to create profile tables",
    )?;

    for admin in &config.admins {
        profiles.grant_role(admin, Role::Admin).await?;
        info!("Granted admin role to {}", admin);
    }

    Ok(Stores {
        bookings: Arc::new(bookings),
        profiles: Arc::new(profiles),
    })
}

//! SQL implementation of the booking store
//!
//! This module provides a SQL implementation of the `BookingStore` trait,
//! including the conflict-checked insert that keeps two overlapping requests
//! from both being stored.

use crate::error::DbError;
use crate::repositories::booking::{
    booking_from_row, format_date, format_time, BOOKING_COLUMNS, CREATE_BOOKINGS_SLOT_INDEX,
    CREATE_BOOKINGS_TABLE, CREATE_PARTNERS_TABLE,
};
use crate::{Backend, DbClient};
use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat, Utc};
use padelbook_common::models::{
    BookingRequest, BookingStatus, Court, NewBookingRequest, Partner, SavedPartner, TimeRange,
};
use padelbook_common::{BookingStore, InsertOutcome, StoreError};
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Inserts the request only if no pending or confirmed request on the same
/// court and date overlaps it. On SQLite the statement takes the database
/// write lock before reading, which serializes concurrent attempts. Under
/// PostgreSQL's READ COMMITTED two transactions can both pass the check, so
/// [`LOCK_BOOKINGS`] runs first in the same transaction.
const INSERT_IF_FREE: &str = r#"
    INSERT INTO bookings (
        id, user_id, court_number, match_date, start_time, end_time,
        partner_1_first_name, partner_1_last_name,
        partner_2_first_name, partner_2_last_name,
        partner_3_first_name, partner_3_last_name,
        status, reservation_opens_at, created_at
    )
    SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending', $13, $14
    WHERE NOT EXISTS (
        SELECT 1 FROM bookings
        WHERE court_number = $3
          AND match_date = $4
          AND status IN ('pending', 'confirmed')
          AND start_time < $6
          AND $5 < end_time
    )
"#;

/// Conflicts with itself, so conflict-checked inserts queue up behind each
/// other. Plain reads are not blocked.
const LOCK_BOOKINGS: &str = "LOCK TABLE bookings IN SHARE ROW EXCLUSIVE MODE";

/// SQL implementation of the booking store
#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlBookingRepository {
    /// Create a new SQL booking repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the `bookings` and `partenaires` tables if they don't exist
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing booking schema");

        self.db_client.execute(CREATE_BOOKINGS_TABLE).await?;
        self.db_client.execute(CREATE_BOOKINGS_SLOT_INDEX).await?;
        self.db_client.execute(CREATE_PARTNERS_TABLE).await?;

        info!("Booking schema initialized successfully");
        Ok(())
    }

    async fn select_bookings(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<BookingRequest>, DbError> {
        let rows = match user_id {
            Some(user_id) => {
                let query = format!(
                    "SELECT {} FROM bookings WHERE user_id = $1 \
                     ORDER BY match_date DESC, start_time DESC",
                    BOOKING_COLUMNS
                );
                sqlx::query(&query)
                    .bind(user_id)
                    .fetch_all(self.db_client.pool())
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {} FROM bookings ORDER BY match_date DESC, start_time DESC",
                    BOOKING_COLUMNS
                );
                sqlx::query(&query).fetch_all(self.db_client.pool()).await
            }
        }
        .map_err(|e| {
            error!("Failed to list bookings: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn delete_pending(&self, booking_id: &str, owner: Option<&str>) -> Result<bool, DbError> {
        let result = match owner {
            Some(owner) => {
                sqlx::query(
                    "DELETE FROM bookings WHERE id = $1 AND user_id = $2 AND status = 'pending'",
                )
                .bind(booking_id)
                .bind(owner)
                .execute(self.db_client.pool())
                .await
            }
            None => {
                sqlx::query("DELETE FROM bookings WHERE id = $1 AND status = 'pending'")
                    .bind(booking_id)
                    .execute(self.db_client.pool())
                    .await
            }
        }
        .map_err(|e| {
            error!("Failed to cancel booking {}: {}", booking_id, e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingStore for SqlBookingRepository {
    async fn list_user_bookings(&self, user_id: &str) -> Result<Vec<BookingRequest>, StoreError> {
        debug!("Listing bookings for user: {}", user_id);
        Ok(self.select_bookings(Some(user_id)).await?)
    }

    async fn list_all_bookings(&self) -> Result<Vec<BookingRequest>, StoreError> {
        debug!("Listing all bookings");
        Ok(self.select_bookings(None).await?)
    }

    async fn has_conflict(
        &self,
        court: Court,
        match_date: NaiveDate,
        range: TimeRange,
    ) -> Result<bool, StoreError> {
        let query = r#"
            SELECT COUNT(*) AS conflicts
            FROM bookings
            WHERE court_number = $1
              AND match_date = $2
              AND status IN ('pending', 'confirmed')
              AND start_time < $4
              AND $3 < end_time
        "#;

        let row = sqlx::query(query)
            .bind(i64::from(court.number()))
            .bind(format_date(match_date))
            .bind(format_time(range.start))
            .bind(format_time(range.end))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to check booking conflicts: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let conflicts: i64 = row.try_get("conflicts").map_err(DbError::from)?;
        Ok(conflicts > 0)
    }

    async fn insert_if_no_conflict(
        &self,
        request: NewBookingRequest,
    ) -> Result<InsertOutcome, StoreError> {
        debug!(
            "Inserting booking for user {} on {} {} {}-{}",
            request.user_id,
            request.court,
            request.match_date,
            request.time_range.start,
            request.time_range.end
        );

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let [p1, p2, p3] = &request.partners;

        let mut tx = self.db_client.begin().await?;

        if self.db_client.backend() == Backend::Postgres {
            sqlx::query(LOCK_BOOKINGS)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to lock bookings table: {}", e);
                    DbError::QueryError(e.to_string())
                })?;
        }

        let result = sqlx::query(INSERT_IF_FREE)
            .bind(&id)
            .bind(&request.user_id)
            .bind(i64::from(request.court.number()))
            .bind(format_date(request.match_date))
            .bind(format_time(request.time_range.start))
            .bind(format_time(request.time_range.end))
            .bind(&p1.first_name)
            .bind(&p1.last_name)
            .bind(&p2.first_name)
            .bind(&p2.last_name)
            .bind(&p3.first_name)
            .bind(&p3.last_name)
            .bind(
                request
                    .reservation_opens_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .bind(created_at.to_rfc3339_opts(SecondsFormat::Millis, true))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to insert booking: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(DbError::from)?;
            info!(
                "Booking for {} on {} rejected: slot already requested",
                request.court, request.match_date
            );
            return Ok(InsertOutcome::Conflict);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!("Booking {} created successfully", id);
        Ok(InsertOutcome::Inserted(BookingRequest {
            id,
            user_id: request.user_id,
            court: request.court,
            match_date: request.match_date,
            start_time: request.time_range.start,
            end_time: request.time_range.end,
            partners: request.partners,
            status: BookingStatus::Pending,
            reservation_opens_at: request.reservation_opens_at,
            created_at: Some(created_at),
        }))
    }

    async fn cancel_pending(&self, booking_id: &str, owner: &str) -> Result<bool, StoreError> {
        debug!("Cancelling booking {} for user {}", booking_id, owner);
        Ok(self.delete_pending(booking_id, Some(owner)).await?)
    }

    async fn cancel_pending_any(&self, booking_id: &str) -> Result<bool, StoreError> {
        debug!("Cancelling booking {} on behalf of an admin", booking_id);
        Ok(self.delete_pending(booking_id, None).await?)
    }

    async fn upsert_partners(&self, user_id: &str, partners: &[Partner]) -> Result<(), StoreError> {
        debug!("Upserting {} partners for user: {}", partners.len(), user_id);

        let query = r#"
            INSERT INTO partenaires (user_id, first_name, last_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, first_name, last_name) DO NOTHING
        "#;

        let mut tx = self.db_client.begin().await?;
        for partner in partners {
            sqlx::query(query)
                .bind(user_id)
                .bind(&partner.first_name)
                .bind(&partner.last_name)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to upsert partner: {}", e);
                    DbError::QueryError(e.to_string())
                })?;
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        Ok(())
    }

    async fn list_partners(&self, user_id: &str) -> Result<Vec<SavedPartner>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, first_name, last_name FROM partenaires \
             WHERE user_id = $1 ORDER BY last_name, first_name",
        )
        .bind(user_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to list partners: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        let partners = rows
            .iter()
            .map(|row| {
                Ok(SavedPartner {
                    user_id: row.try_get("user_id")?,
                    first_name: row.try_get("first_name")?,
                    last_name: row.try_get("last_name")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(DbError::from)?;

        Ok(partners)
    }
}

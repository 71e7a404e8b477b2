//! SQL implementation of the profile store

use crate::error::DbError;
use crate::DbClient;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use padelbook_common::models::{ClubCredentials, Profile, Role};
use padelbook_common::{ProfileStore, StoreError};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};
use tracing::{debug, error, info};

const CREATE_PROFILES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        first_name TEXT,
        last_name TEXT,
        club_id TEXT,
        club_password TEXT,
        updated_at TEXT
    )
"#;

const CREATE_USER_ROLES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        user_id TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('user', 'admin')),
        UNIQUE (user_id, role)
    )
"#;

const PROFILE_COLUMNS: &str = "id, first_name, last_name, club_id, club_password, updated_at";

fn now_text() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Nullable text column. The `Any` driver reports a NULL value with the NULL
/// type, which `Option<String>` does not accept, so NULL is checked first.
fn optional_text(row: &AnyRow, column: &str) -> Result<Option<String>, DbError> {
    let decode_error = |e: sqlx::Error| DbError::DecodeError(format!("{}: {}", column, e));
    if row.try_get_raw(column).map_err(decode_error)?.is_null() {
        return Ok(None);
    }
    row.try_get::<String, _>(column).map(Some).map_err(decode_error)
}

fn profile_from_row(row: &AnyRow) -> Result<Profile, DbError> {
    let user_id: String = row
        .try_get("id")
        .map_err(|e| DbError::DecodeError(format!("id: {}", e)))?;

    let credentials = match (
        optional_text(row, "club_id")?,
        optional_text(row, "club_password")?,
    ) {
        (Some(club_id), Some(password)) => Some(ClubCredentials { club_id, password }),
        _ => None,
    };

    let updated_at = optional_text(row, "updated_at")?
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Profile {
        user_id,
        first_name: optional_text(row, "first_name")?,
        last_name: optional_text(row, "last_name")?,
        credentials,
        updated_at,
    })
}

/// SQL implementation of the profile store
#[derive(Debug, Clone)]
pub struct SqlProfileRepository {
    db_client: DbClient,
}

impl SqlProfileRepository {
    /// Create a new SQL profile repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the `profiles` and `user_roles` tables if they don't exist
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing profile schema");

        self.db_client.execute(CREATE_PROFILES_TABLE).await?;
        self.db_client.execute(CREATE_USER_ROLES_TABLE).await?;

        info!("Profile schema initialized successfully");
        Ok(())
    }

    /// Give `role` to the user. Granting a role twice is a no-op.
    pub async fn grant_role(&self, user_id: &str, role: Role) -> Result<(), DbError> {
        debug!("Granting role {} to user {}", role.as_str(), user_id);

        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) \
             ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to grant role: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, DbError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to get profile: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn fetch_existing(&self, user_id: &str) -> Result<Profile, DbError> {
        self.fetch_profile(user_id)
            .await?
            .ok_or_else(|| DbError::QueryError(format!("Profile {} vanished after write", user_id)))
    }
}

#[async_trait]
impl ProfileStore for SqlProfileRepository {
    async fn ensure_profile(&self, user_id: &str) -> Result<Profile, StoreError> {
        sqlx::query(
            "INSERT INTO profiles (id, updated_at) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(user_id)
        .bind(now_text())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to create profile: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(self.fetch_existing(user_id).await?)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        debug!("Getting profile for user: {}", user_id);
        Ok(self.fetch_profile(user_id).await?)
    }

    async fn update_names(
        &self,
        user_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Profile, StoreError> {
        debug!("Updating names for user: {}", user_id);

        sqlx::query(
            r#"
            INSERT INTO profiles (id, first_name, last_name, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(now_text())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to update profile names: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(self.fetch_existing(user_id).await?)
    }

    async fn save_credentials(
        &self,
        user_id: &str,
        credentials: &ClubCredentials,
    ) -> Result<(), StoreError> {
        debug!("Saving club credentials for user: {}", user_id);

        sqlx::query(
            r#"
            INSERT INTO profiles (id, club_id, club_password, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                club_id = excluded.club_id,
                club_password = excluded.club_password,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&credentials.club_id)
        .bind(&credentials.password)
        .bind(now_text())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to save club credentials: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        info!("Club credentials saved for user {}", user_id);
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let query = format!("SELECT {} FROM profiles ORDER BY id", PROFILE_COLUMNS);
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list profiles: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn role_of(&self, user_id: &str) -> Result<Role, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS admins FROM user_roles WHERE user_id = $1 AND role = 'admin'",
        )
        .bind(user_id)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to look up role: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        let admins: i64 = row.try_get("admins").map_err(DbError::from)?;
        Ok(if admins > 0 { Role::Admin } else { Role::User })
    }
}

// ABOUTME: SQLite connection pool, schema migrations and per-entity managers
// ABOUTME: Each entity module owns its tables and exposes a manager over the shared pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! `Database` owns the pool and creates the schema at startup with idempotent
//! `CREATE TABLE IF NOT EXISTS` statements. Entity access goes through small
//! managers (`UsersManager`, `RecipientsManager`, ...) that each hold a clone
//! of the pool.
//!
//! Storage conventions: ids are UUID text, timestamps RFC 3339 text, calendar
//! dates `YYYY-MM-DD` text and string lists JSON arrays.

/// Event and occurrence storage, including the occurrence generator
pub mod events;
/// Gift idea storage
pub mod ideas;
/// Uploaded media metadata
pub mod media;
/// Recipient storage
pub mod recipients;
/// User accounts
pub mod users;

pub use events::EventsManager;
pub use ideas::IdeasManager;
pub use media::MediaManager;
pub use recipients::RecipientsManager;
pub use users::UsersManager;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Tables in dependency order, children first
const TABLES: &[&str] = &[
    "event_occurrences",
    "events",
    "gift_ideas",
    "recipients",
    "users",
    "media_files",
];

/// Database manager owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// File databases are created when missing. In-memory databases are
    /// limited to a single connection so every query sees the same schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration fails
    pub async fn new(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config_invalid("DATABASE_URL", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// User account manager
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Recipient manager
    #[must_use]
    pub fn recipients(&self) -> RecipientsManager {
        RecipientsManager::new(self.pool.clone())
    }

    /// Event and occurrence manager
    #[must_use]
    pub fn events(&self) -> EventsManager {
        EventsManager::new(self.pool.clone())
    }

    /// Gift idea manager
    #[must_use]
    pub fn ideas(&self) -> IdeasManager {
        IdeasManager::new(self.pool.clone())
    }

    /// Media metadata manager
    #[must_use]
    pub fn media(&self) -> MediaManager {
        MediaManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index cannot be created
    pub async fn migrate(&self) -> AppResult<()> {
        media::migrate(&self.pool).await?;
        users::migrate(&self.pool).await?;
        recipients::migrate(&self.pool).await?;
        events::migrate(&self.pool).await?;
        ideas::migrate(&self.pool).await?;
        tracing::debug!("Database schema is up to date");
        Ok(())
    }

    /// Delete every row from every table, keeping the schema
    ///
    /// # Errors
    ///
    /// Returns an error if a delete fails; the transaction is rolled back
    pub async fn clean(&self) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for table in TABLES {
            let result = sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to clean {table}: {e}")))?;
            removed += result.rows_affected();
        }
        tx.commit().await?;
        tracing::warn!(rows = removed, "Database cleaned");
        Ok(removed)
    }
}

pub(crate) fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID '{value}': {e}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>) -> AppResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{value}': {e}")))
}

pub(crate) fn parse_optional_timestamp(value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::internal(format!("Invalid date '{value}': {e}")))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn encode_list(list: Option<&[String]>) -> AppResult<Option<String>> {
    list.map(serde_json::to_string).transpose().map_err(AppError::from)
}

pub(crate) fn decode_list(value: Option<String>) -> AppResult<Option<Vec<String>>> {
    value
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(AppError::from)
}

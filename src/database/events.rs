// ABOUTME: Event and occurrence persistence plus the yearly occurrence generator
// ABOUTME: Events are soft-deleted; occurrences are unique per (event, date) and inserted idempotently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, Utc};
use giftminder_core::models::{Event, EventOccurrence, EventType, EventUpdate};
use giftminder_core::pagination::Pagination;
use giftminder_core::recurrence::missing_occurrences;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::{
    format_date, parse_date, parse_optional_timestamp, parse_optional_uuid, parse_timestamp,
    parse_uuid,
};
use crate::errors::{AppError, AppResult};

/// Sortable event fields; the first is the default
pub const EVENT_ORDER_FIELDS: &[(&str, &str)] = &[
    ("created_at", "created_at"),
    ("title", "title"),
    ("start_date", "start_date"),
    ("type", "type"),
];

pub(super) async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            type TEXT NOT NULL DEFAULT 'OTHER',
            is_global BOOLEAN NOT NULL DEFAULT 0,
            is_repeating BOOLEAN NOT NULL DEFAULT 1,
            start_date TEXT NOT NULL,
            user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
            recipient_id TEXT REFERENCES recipients(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT,
            CHECK (is_global = 0 OR recipient_id IS NULL)
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to create events table: {e}")))?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS event_occurrences (
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            occurrence_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (event_id, occurrence_date)
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to create event_occurrences table: {e}")))?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_events_user_id ON events(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_events_recipient_id ON events(recipient_id)",
        "CREATE INDEX IF NOT EXISTS idx_occurrences_date ON event_occurrences(occurrence_date)",
    ] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create events index: {e}")))?;
    }

    Ok(())
}

/// Event and occurrence manager
#[derive(Clone)]
pub struct EventsManager {
    pool: SqlitePool,
}

impl EventsManager {
    /// Create a new events manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an event together with its first occurrence at `start_date`
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; nothing is stored in that case
    pub async fn create(&self, event: &Event) -> AppResult<EventOccurrence> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO events (id, title, type, is_global, is_repeating, start_date, user_id, recipient_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(event.id.to_string())
        .bind(&event.title)
        .bind(event.event_type.as_str())
        .bind(event.is_global)
        .bind(event.is_repeating)
        .bind(format_date(event.start_date))
        .bind(event.user_id.map(|id| id.to_string()))
        .bind(event.recipient_id.map(|id| id.to_string()))
        .bind(event.created_at.to_rfc3339())
        .bind(event.updated_at.map(|t| t.to_rfc3339()))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create event: {e}")))?;

        let occurrence = EventOccurrence {
            id: Uuid::new_v4(),
            occurrence_date: event.start_date,
            created_at: Utc::now(),
            event_id: event.id,
        };
        insert_occurrence(&mut tx, &occurrence).await?;

        tx.commit().await?;
        Ok(occurrence)
    }

    /// Get a non-deleted event by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        let row = sqlx::query("SELECT * FROM events WHERE id = $1 AND deleted_at IS NULL")
            .bind(event_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get event: {e}")))?;

        row.as_ref().map(row_to_event).transpose()
    }

    /// List non-deleted events
    ///
    /// With `viewer` set only that user's events and global events are
    /// returned; `None` lists everything.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ordering or a failed query
    pub async fn list(&self, viewer: Option<Uuid>, page: &Pagination) -> AppResult<Vec<Event>> {
        let order = page.order_clause(EVENT_ORDER_FIELDS)?;
        let query = format!(
            r"
            SELECT * FROM events
            WHERE deleted_at IS NULL
              AND ($1 IS NULL OR user_id = $1 OR is_global = 1)
            {order}
            LIMIT $2 OFFSET $3
            "
        );

        let rows = sqlx::query(&query)
            .bind(viewer.map(|id| id.to_string()))
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list events: {e}")))?;

        rows.iter().map(row_to_event).collect()
    }

    /// Update title and type; absent fields are kept
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the event does not exist or is deleted
    pub async fn update(&self, event_id: Uuid, update: &EventUpdate) -> AppResult<Event> {
        let result = sqlx::query(
            r"
            UPDATE events SET
                title = COALESCE($2, title),
                type = COALESCE($3, type),
                updated_at = $4
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(event_id.to_string())
        .bind(&update.title)
        .bind(update.event_type.map(|t| t.as_str()))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update event: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Event"));
        }
        self.get(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event"))
    }

    /// Mark an event deleted; its occurrences stay but are no longer listed
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the event does not exist or is already deleted
    pub async fn soft_delete(&self, event_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE events SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(event_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete event: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Event"));
        }
        Ok(())
    }

    /// Occurrences of one event, optionally limited to an inclusive date range
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn occurrences(
        &self,
        event_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<EventOccurrence>> {
        let (from, to) = range.map_or((None, None), |(from, to)| {
            (Some(format_date(from)), Some(format_date(to)))
        });

        let rows = sqlx::query(
            r"
            SELECT * FROM event_occurrences
            WHERE event_id = $1
              AND ($2 IS NULL OR occurrence_date >= $2)
              AND ($3 IS NULL OR occurrence_date <= $3)
            ORDER BY occurrence_date ASC
            ",
        )
        .bind(event_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list occurrences: {e}")))?;

        rows.iter().map(row_to_occurrence).collect()
    }

    /// First occurrence on or after `today`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn next_occurrence(
        &self,
        event_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Option<EventOccurrence>> {
        let row = sqlx::query(
            r"
            SELECT * FROM event_occurrences
            WHERE event_id = $1 AND occurrence_date >= $2
            ORDER BY occurrence_date ASC
            LIMIT 1
            ",
        )
        .bind(event_id.to_string())
        .bind(format_date(today))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get next occurrence: {e}")))?;

        row.as_ref().map(row_to_occurrence).transpose()
    }

    /// Occurrences of all visible, non-deleted events within an inclusive range
    ///
    /// `viewer` has the same meaning as in [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn occurrences_in_range(
        &self,
        viewer: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<EventOccurrence>> {
        let rows = sqlx::query(
            r"
            SELECT o.* FROM event_occurrences o
            JOIN events e ON e.id = o.event_id
            WHERE e.deleted_at IS NULL
              AND ($1 IS NULL OR e.user_id = $1 OR e.is_global = 1)
              AND o.occurrence_date >= $2
              AND o.occurrence_date <= $3
            ORDER BY o.occurrence_date ASC, o.created_at ASC
            ",
        )
        .bind(viewer.map(|id| id.to_string()))
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load calendar: {e}")))?;

        rows.iter().map(row_to_occurrence).collect()
    }

    /// Materialise missing yearly occurrences of every repeating event
    ///
    /// After a run each non-deleted repeating event has an occurrence on or
    /// after `today`. Returns the number of occurrences created.
    ///
    /// # Errors
    ///
    /// Returns an error if loading events or inserting fails; the whole run
    /// is rolled back in that case
    pub async fn generate_missing_occurrences(&self, today: NaiveDate) -> AppResult<u64> {
        let rows = sqlx::query(
            r"
            SELECT e.id, e.start_date, MAX(o.occurrence_date) AS latest
            FROM events e
            LEFT JOIN event_occurrences o ON o.event_id = e.id
            WHERE e.is_repeating = 1 AND e.deleted_at IS NULL
            GROUP BY e.id, e.start_date
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load repeating events: {e}")))?;

        let mut tx = self.pool.begin().await?;
        let mut created = 0;

        for row in &rows {
            let event_id: String = row.get("id");
            let start_date: String = row.get("start_date");
            let latest: Option<String> = row.get("latest");

            let event_id = parse_uuid(&event_id)?;
            let start = parse_date(&start_date)?;
            let latest = latest.as_deref().map(parse_date).transpose()?;

            for date in missing_occurrences(start, latest, today) {
                let occurrence = EventOccurrence {
                    id: Uuid::new_v4(),
                    occurrence_date: date,
                    created_at: Utc::now(),
                    event_id,
                };
                created += insert_occurrence(&mut tx, &occurrence).await?;
            }
        }

        tx.commit().await?;
        Ok(created)
    }
}

/// `INSERT OR IGNORE` one occurrence, returning 1 when a row was added
async fn insert_occurrence(
    tx: &mut Transaction<'_, Sqlite>,
    occurrence: &EventOccurrence,
) -> AppResult<u64> {
    let result = sqlx::query(
        r"
        INSERT OR IGNORE INTO event_occurrences (id, event_id, occurrence_date, created_at)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(occurrence.id.to_string())
    .bind(occurrence.event_id.to_string())
    .bind(format_date(occurrence.occurrence_date))
    .bind(occurrence.created_at.to_rfc3339())
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to insert occurrence: {e}")))?;

    Ok(result.rows_affected())
}

fn row_to_event(row: &SqliteRow) -> AppResult<Event> {
    let id: String = row.get("id");
    let event_type: String = row.get("type");
    let start_date: String = row.get("start_date");
    let created_at: String = row.get("created_at");

    Ok(Event {
        id: parse_uuid(&id)?,
        title: row.get("title"),
        event_type: EventType::parse(&event_type),
        is_global: row.get("is_global"),
        is_repeating: row.get("is_repeating"),
        start_date: parse_date(&start_date)?,
        user_id: parse_optional_uuid(row.get("user_id"))?,
        recipient_id: parse_optional_uuid(row.get("recipient_id"))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_optional_timestamp(row.get("updated_at"))?,
        deleted_at: parse_optional_timestamp(row.get("deleted_at"))?,
    })
}

fn row_to_occurrence(row: &SqliteRow) -> AppResult<EventOccurrence> {
    let id: String = row.get("id");
    let event_id: String = row.get("event_id");
    let occurrence_date: String = row.get("occurrence_date");
    let created_at: String = row.get("created_at");

    Ok(EventOccurrence {
        id: parse_uuid(&id)?,
        occurrence_date: parse_date(&occurrence_date)?,
        created_at: parse_timestamp(&created_at)?,
        event_id: parse_uuid(&event_id)?,
    })
}

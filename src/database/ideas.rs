// ABOUTME: Gift idea persistence
// ABOUTME: Private and global ideas with archive and soft-delete timestamps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use giftminder_core::models::{GiftIdea, GiftIdeaUpdate, IdeaScope};
use giftminder_core::pagination::Pagination;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{
    decode_list, encode_list, parse_optional_timestamp, parse_optional_uuid, parse_timestamp,
    parse_uuid,
};
use crate::errors::{AppError, AppResult};

/// Sortable idea fields; the first is the default
pub const IDEA_ORDER_FIELDS: &[(&str, &str)] = &[
    ("created_at", "created_at"),
    ("title", "title"),
    ("estimated_price", "estimated_price"),
    ("archived_at", "archived_at"),
];

pub(super) async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS gift_ideas (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            tags TEXT,
            description TEXT,
            view_url TEXT,
            estimated_price REAL CHECK (estimated_price IS NULL OR estimated_price >= 0),
            is_global BOOLEAN NOT NULL DEFAULT 0,
            user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
            archived_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            deleted_at TEXT
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to create gift_ideas table: {e}")))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_gift_ideas_user_id ON gift_ideas(user_id)")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create gift_ideas index: {e}")))?;

    Ok(())
}

/// Gift idea manager
#[derive(Clone)]
pub struct IdeasManager {
    pool: SqlitePool,
}

impl IdeasManager {
    /// Create a new ideas manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an idea
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, idea: &GiftIdea) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO gift_ideas (
                id, title, tags, description, view_url, estimated_price,
                is_global, user_id, archived_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(idea.id.to_string())
        .bind(&idea.title)
        .bind(encode_list(idea.tags.as_deref())?)
        .bind(&idea.description)
        .bind(&idea.view_url)
        .bind(idea.estimated_price)
        .bind(idea.is_global)
        .bind(idea.user_id.map(|id| id.to_string()))
        .bind(idea.archived_at.map(|t| t.to_rfc3339()))
        .bind(idea.created_at.to_rfc3339())
        .bind(idea.updated_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create idea: {e}")))?;

        Ok(())
    }

    /// Get a non-deleted idea by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get(&self, idea_id: Uuid) -> AppResult<Option<GiftIdea>> {
        let row = sqlx::query("SELECT * FROM gift_ideas WHERE id = $1 AND deleted_at IS NULL")
            .bind(idea_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get idea: {e}")))?;

        row.as_ref().map(row_to_idea).transpose()
    }

    /// List non-deleted ideas of one scope, archived or not
    ///
    /// `Own` lists ideas authored by `user_id`; `Global` lists every global
    /// idea regardless of author.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ordering or a failed query
    pub async fn list(
        &self,
        scope: IdeaScope,
        user_id: Uuid,
        archived: bool,
        page: &Pagination,
    ) -> AppResult<Vec<GiftIdea>> {
        let order = page.order_clause(IDEA_ORDER_FIELDS)?;
        let author = match scope {
            IdeaScope::Own => Some(user_id.to_string()),
            IdeaScope::Global => None,
        };
        let archive_filter = if archived {
            "archived_at IS NOT NULL"
        } else {
            "archived_at IS NULL"
        };
        let query = format!(
            r"
            SELECT * FROM gift_ideas
            WHERE deleted_at IS NULL
              AND CASE WHEN $1 IS NULL THEN is_global = 1 ELSE user_id = $1 END
              AND {archive_filter}
            {order}
            LIMIT $2 OFFSET $3
            "
        );

        let rows = sqlx::query(&query)
            .bind(author)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list ideas: {e}")))?;

        rows.iter().map(row_to_idea).collect()
    }

    /// Apply a partial update
    ///
    /// Absent fields are kept; `Some(None)` clears a nullable column.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the idea does not exist or is deleted
    pub async fn update(&self, idea_id: Uuid, update: &GiftIdeaUpdate) -> AppResult<GiftIdea> {
        let result = sqlx::query(
            r"
            UPDATE gift_ideas SET
                title = COALESCE($2, title),
                tags = CASE WHEN $3 THEN $4 ELSE tags END,
                description = CASE WHEN $5 THEN $6 ELSE description END,
                view_url = CASE WHEN $7 THEN $8 ELSE view_url END,
                estimated_price = CASE WHEN $9 THEN $10 ELSE estimated_price END,
                updated_at = $11
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(idea_id.to_string())
        .bind(&update.title)
        .bind(update.tags.is_some())
        .bind(encode_list(update.tags.as_ref().and_then(Option::as_deref))?)
        .bind(update.description.is_some())
        .bind(update.description.clone().flatten())
        .bind(update.view_url.is_some())
        .bind(update.view_url.clone().flatten())
        .bind(update.estimated_price.is_some())
        .bind(update.estimated_price.flatten())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update idea: {e}")))?;

        self.fetch_updated(idea_id, result.rows_affected()).await
    }

    /// Archive an idea; archiving twice keeps the first timestamp
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the idea does not exist or is deleted
    pub async fn archive(&self, idea_id: Uuid) -> AppResult<GiftIdea> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r"
            UPDATE gift_ideas SET archived_at = COALESCE(archived_at, $2), updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(idea_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to archive idea: {e}")))?;

        self.fetch_updated(idea_id, result.rows_affected()).await
    }

    /// Mark an idea deleted
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the idea does not exist or is already deleted
    pub async fn soft_delete(&self, idea_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE gift_ideas SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(idea_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete idea: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Idea"));
        }
        Ok(())
    }

    async fn fetch_updated(&self, idea_id: Uuid, rows_affected: u64) -> AppResult<GiftIdea> {
        if rows_affected == 0 {
            return Err(AppError::not_found("Idea"));
        }
        self.get(idea_id)
            .await?
            .ok_or_else(|| AppError::not_found("Idea"))
    }
}

fn row_to_idea(row: &SqliteRow) -> AppResult<GiftIdea> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");

    Ok(GiftIdea {
        id: parse_uuid(&id)?,
        title: row.get("title"),
        tags: decode_list(row.get("tags"))?,
        description: row.get("description"),
        view_url: row.get("view_url"),
        estimated_price: row.get("estimated_price"),
        is_global: row.get("is_global"),
        user_id: parse_optional_uuid(row.get("user_id"))?,
        archived_at: parse_optional_timestamp(row.get("archived_at"))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_optional_timestamp(row.get("updated_at"))?,
        deleted_at: parse_optional_timestamp(row.get("deleted_at"))?,
    })
}

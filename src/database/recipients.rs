// ABOUTME: Recipient persistence
// ABOUTME: CRUD for the people a user buys gifts for, with owner-scoped listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, Utc};
use giftminder_core::models::{Recipient, RecipientInfoUpdate};
use giftminder_core::pagination::Pagination;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{
    decode_list, encode_list, format_date, parse_date, parse_optional_timestamp, parse_timestamp,
    parse_uuid,
};
use crate::errors::{AppError, AppResult};

/// Sortable recipient fields; the first is the default
pub const RECIPIENT_ORDER_FIELDS: &[(&str, &str)] = &[
    ("created_at", "created_at"),
    ("name", "name"),
    ("birthday", "birthday"),
    ("relation", "relation"),
];

pub(super) async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS recipients (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            birthday TEXT NOT NULL,
            relation TEXT NOT NULL,
            preferences TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to create recipients table: {e}")))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipients_user_id ON recipients(user_id)")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipients index: {e}")))?;

    Ok(())
}

/// Recipient manager
#[derive(Clone)]
pub struct RecipientsManager {
    pool: SqlitePool,
}

impl RecipientsManager {
    /// Create a new recipients manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a recipient
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, recipient: &Recipient) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO recipients (id, user_id, name, birthday, relation, preferences, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(recipient.id.to_string())
        .bind(recipient.user_id.to_string())
        .bind(&recipient.name)
        .bind(format_date(recipient.birthday))
        .bind(&recipient.relation)
        .bind(encode_list(recipient.preferences.as_deref())?)
        .bind(&recipient.notes)
        .bind(recipient.created_at.to_rfc3339())
        .bind(recipient.updated_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipient: {e}")))?;

        Ok(())
    }

    /// Get a recipient by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get(&self, recipient_id: Uuid) -> AppResult<Option<Recipient>> {
        let row = sqlx::query("SELECT * FROM recipients WHERE id = $1")
            .bind(recipient_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get recipient: {e}")))?;

        row.as_ref().map(row_to_recipient).transpose()
    }

    /// List recipients, restricted to one owner when `owner` is set
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ordering or a failed query
    pub async fn list(
        &self,
        owner: Option<Uuid>,
        page: &Pagination,
    ) -> AppResult<Vec<Recipient>> {
        let order = page.order_clause(RECIPIENT_ORDER_FIELDS)?;
        let query = format!(
            r"
            SELECT * FROM recipients
            WHERE ($1 IS NULL OR user_id = $1)
            {order}
            LIMIT $2 OFFSET $3
            "
        );

        let rows = sqlx::query(&query)
            .bind(owner.map(|id| id.to_string()))
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipients: {e}")))?;

        rows.iter().map(row_to_recipient).collect()
    }

    /// Update name, relation, preferences and notes
    ///
    /// Absent fields are kept; `Some(None)` clears preferences or notes.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the recipient does not exist
    pub async fn update_info(
        &self,
        recipient_id: Uuid,
        update: &RecipientInfoUpdate,
    ) -> AppResult<Recipient> {
        let result = sqlx::query(
            r"
            UPDATE recipients SET
                name = COALESCE($2, name),
                relation = COALESCE($3, relation),
                preferences = CASE WHEN $4 THEN $5 ELSE preferences END,
                notes = CASE WHEN $6 THEN $7 ELSE notes END,
                updated_at = $8
            WHERE id = $1
            ",
        )
        .bind(recipient_id.to_string())
        .bind(&update.name)
        .bind(&update.relation)
        .bind(update.preferences.is_some())
        .bind(encode_list(update.preferences.as_ref().and_then(Option::as_deref))?)
        .bind(update.notes.is_some())
        .bind(update.notes.clone().flatten())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipient: {e}")))?;

        self.fetch_updated(recipient_id, result.rows_affected()).await
    }

    /// Replace the birthday
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the recipient does not exist
    pub async fn set_birthday(&self, recipient_id: Uuid, birthday: NaiveDate) -> AppResult<Recipient> {
        let result = sqlx::query("UPDATE recipients SET birthday = $2, updated_at = $3 WHERE id = $1")
            .bind(recipient_id.to_string())
            .bind(format_date(birthday))
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set birthday: {e}")))?;

        self.fetch_updated(recipient_id, result.rows_affected()).await
    }

    async fn fetch_updated(&self, recipient_id: Uuid, rows_affected: u64) -> AppResult<Recipient> {
        if rows_affected == 0 {
            return Err(AppError::not_found("Recipient"));
        }
        self.get(recipient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipient"))
    }

    /// Hard-delete a recipient and detach the events that referenced it
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the recipient does not exist
    pub async fn delete(&self, recipient_id: Uuid) -> AppResult<()> {
        let id = recipient_id.to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE events SET recipient_id = NULL WHERE recipient_id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to detach events: {e}")))?;

        let result = sqlx::query("DELETE FROM recipients WHERE id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipient: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipient"));
        }
        tx.commit().await?;
        Ok(())
    }
}

fn row_to_recipient(row: &SqliteRow) -> AppResult<Recipient> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let birthday: String = row.get("birthday");
    let created_at: String = row.get("created_at");

    Ok(Recipient {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        name: row.get("name"),
        birthday: parse_date(&birthday)?,
        relation: row.get("relation"),
        preferences: decode_list(row.get("preferences"))?,
        notes: row.get("notes"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_optional_timestamp(row.get("updated_at"))?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::database::Database;
    use giftminder_core::models::{User, UserRole};

    async fn setup() -> (Database, User) {
        let db = Database::new("sqlite::memory:", 1).await.unwrap();
        let owner = User::new(
            "owner".into(),
            "owner@example.com".into(),
            "hash".into(),
            UserRole::User,
            true,
        );
        db.users().create(&owner).await.unwrap();
        (db, owner)
    }

    fn recipient(owner: Uuid, name: &str) -> Recipient {
        Recipient {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.to_owned(),
            birthday: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            relation: "friend".to_owned(),
            preferences: Some(vec!["books".to_owned()]),
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let (db, owner) = setup().await;
        let recipients = db.recipients();
        let mia = recipient(owner.id, "Mia");
        recipients.create(&mia).await.unwrap();
        recipients.create(&recipient(owner.id, "Ben")).await.unwrap();

        let fetched = recipients.get(mia.id).await.unwrap().unwrap();
        assert_eq!(fetched.preferences, Some(vec!["books".to_owned()]));

        let page = Pagination {
            order_by: Some("name".to_owned()),
            ..Pagination::default()
        };
        let listed = recipients.list(Some(owner.id), &page).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Mia"]);

        assert!(recipients
            .list(Some(Uuid::new_v4()), &page)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(recipients.list(None, &page).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_info_keeps_absent_fields() {
        let (db, owner) = setup().await;
        let recipients = db.recipients();
        let mia = recipient(owner.id, "Mia");
        recipients.create(&mia).await.unwrap();

        let update = RecipientInfoUpdate {
            notes: Some(Some("allergic to nuts".to_owned())),
            ..RecipientInfoUpdate::default()
        };
        let updated = recipients.update_info(mia.id, &update).await.unwrap();
        assert_eq!(updated.name, "Mia");
        assert_eq!(updated.notes.as_deref(), Some("allergic to nuts"));

        let birthday = NaiveDate::from_ymd_opt(1991, 1, 2).unwrap();
        let moved = recipients.set_birthday(mia.id, birthday).await.unwrap();
        assert_eq!(moved.birthday, birthday);
    }

    #[tokio::test]
    async fn test_update_info_clears_nullable_fields() {
        let (db, owner) = setup().await;
        let recipients = db.recipients();
        let mut mia = recipient(owner.id, "Mia");
        mia.preferences = Some(vec!["books".to_owned()]);
        mia.notes = Some("likes tea".to_owned());
        recipients.create(&mia).await.unwrap();

        let keep = RecipientInfoUpdate {
            relation: Some("cousin".to_owned()),
            ..RecipientInfoUpdate::default()
        };
        let kept = recipients.update_info(mia.id, &keep).await.unwrap();
        assert_eq!(kept.notes.as_deref(), Some("likes tea"));
        assert_eq!(kept.preferences, Some(vec!["books".to_owned()]));

        let clear = RecipientInfoUpdate {
            preferences: Some(None),
            notes: Some(None),
            ..RecipientInfoUpdate::default()
        };
        let cleared = recipients.update_info(mia.id, &clear).await.unwrap();
        assert_eq!(cleared.relation, "cousin");
        assert!(cleared.notes.is_none());
        assert!(cleared.preferences.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_recipient() {
        let (db, owner) = setup().await;
        let recipients = db.recipients();
        let mia = recipient(owner.id, "Mia");
        recipients.create(&mia).await.unwrap();
        recipients.delete(mia.id).await.unwrap();
        assert!(recipients.get(mia.id).await.unwrap().is_none());
        assert!(recipients.delete(mia.id).await.is_err());
    }
}

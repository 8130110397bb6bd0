// ABOUTME: Uploaded media metadata persistence
// ABOUTME: Records are keyed by id and deduplicated by SHA-256 content hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use giftminder_core::models::{MediaFile, MediaType};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};

pub(super) async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS media_files (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL UNIQUE,
            hash TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL CHECK (type IN ('AVATAR', 'CONTENT')),
            alt TEXT,
            mime_type TEXT NOT NULL,
            size INTEGER NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL,
            ratio REAL NOT NULL,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to create media_files table: {e}")))?;

    Ok(())
}

/// Media metadata manager
#[derive(Clone)]
pub struct MediaManager {
    pool: SqlitePool,
}

impl MediaManager {
    /// Create a new media manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a media record
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the hash or URL is already stored
    pub async fn create(&self, media: &MediaFile) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO media_files (id, url, hash, type, alt, mime_type, size, width, height, ratio, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(media.id.to_string())
        .bind(&media.url)
        .bind(&media.hash)
        .bind(media.media_type.as_str())
        .bind(&media.alt)
        .bind(&media.mime_type)
        .bind(i64::try_from(media.size).unwrap_or(i64::MAX))
        .bind(i64::from(media.width))
        .bind(i64::from(media.height))
        .bind(media.ratio)
        .bind(media.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a media record by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get(&self, media_id: Uuid) -> AppResult<Option<MediaFile>> {
        let row = sqlx::query("SELECT * FROM media_files WHERE id = $1")
            .bind(media_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get media: {e}")))?;

        row.as_ref().map(row_to_media).transpose()
    }

    /// Get a media record by content hash
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_by_hash(&self, hash: &str) -> AppResult<Option<MediaFile>> {
        let row = sqlx::query("SELECT * FROM media_files WHERE hash = $1")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get media by hash: {e}")))?;

        row.as_ref().map(row_to_media).transpose()
    }

    /// Remove a media record
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn delete(&self, media_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM media_files WHERE id = $1")
            .bind(media_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete media: {e}")))?;
        Ok(())
    }
}

fn row_to_media(row: &SqliteRow) -> AppResult<MediaFile> {
    let id: String = row.get("id");
    let media_type: String = row.get("type");
    let created_at: String = row.get("created_at");
    let size: i64 = row.get("size");
    let width: i64 = row.get("width");
    let height: i64 = row.get("height");

    let dimension = |value: i64| {
        u32::try_from(value)
            .map_err(|_| AppError::internal(format!("Invalid stored image dimension {value}")))
    };

    Ok(MediaFile {
        id: parse_uuid(&id)?,
        url: row.get("url"),
        hash: row.get("hash"),
        media_type: MediaType::parse(&media_type)
            .ok_or_else(|| AppError::internal(format!("Unknown media type '{media_type}'")))?,
        alt: row.get("alt"),
        mime_type: row.get("mime_type"),
        size: u64::try_from(size)
            .map_err(|_| AppError::internal(format!("Invalid stored media size {size}")))?,
        width: dimension(width)?,
        height: dimension(height)?,
        ratio: row.get("ratio"),
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::errors::ErrorCode;
    use chrono::Utc;

    fn media(hash: &str) -> MediaFile {
        MediaFile {
            id: Uuid::new_v4(),
            url: format!("https://bucket.example.com/avatar/{hash}.png"),
            hash: hash.to_owned(),
            media_type: MediaType::Avatar,
            alt: Some("portrait".to_owned()),
            mime_type: "image/png".to_owned(),
            size: 2048,
            width: 64,
            height: 64,
            ratio: 1.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_hash() {
        let manager = Database::new("sqlite::memory:", 1).await.unwrap().media();
        let file = media("abc123");
        manager.create(&file).await.unwrap();

        let by_hash = manager.get_by_hash("abc123").await.unwrap().unwrap();
        assert_eq!(by_hash.id, file.id);
        assert_eq!(by_hash.media_type, MediaType::Avatar);
        assert_eq!((by_hash.width, by_hash.height, by_hash.size), (64, 64, 2048));
        assert!(manager.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_hash_conflicts() {
        let manager = Database::new("sqlite::memory:", 1).await.unwrap().media();
        manager.create(&media("same")).await.unwrap();
        let mut clash = media("same");
        clash.url = "https://elsewhere.example.com/x.png".to_owned();
        let err = manager.create(&clash).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    }
}

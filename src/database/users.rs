// ABOUTME: User account persistence
// ABOUTME: Registration, lookup by id/email/username, activation and profile updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use giftminder_core::models::{User, UserProfileUpdate, UserRole};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_optional_timestamp, parse_optional_uuid, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};

const USER_COLUMNS: &str = "id, username, email, role, hashed_password, is_active, ava_id, bio, created_at, updated_at";

/// Create the users table and its indexes
pub(super) async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'USER' CHECK (role IN ('USER', 'ADMIN', 'ROOT')),
            hashed_password TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT 0,
            ava_id TEXT REFERENCES media_files(id) ON DELETE SET NULL,
            bio TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to create users table: {e}")))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create users index: {e}")))?;

    Ok(())
}

/// User account manager
#[derive(Clone)]
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a new users manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the email or username is taken,
    /// or a database error
    pub async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, email, role, hashed_password, is_active, ava_id, bio, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.hashed_password)
        .bind(user.is_active)
        .bind(user.ava_id.map(|id| id.to_string()))
        .bind(&user.bio)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.get_by_column("id", &user_id.to_string()).await
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_by_column("email", email).await
    }

    /// Get a user by username
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.get_by_column("username", username).await
    }

    async fn get_by_column(&self, column: &str, value: &str) -> AppResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by {column}: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Mark a user active
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist
    pub async fn activate(&self, user_id: Uuid) -> AppResult<User> {
        let result = sqlx::query("UPDATE users SET is_active = 1, updated_at = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to activate user: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        self.get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Apply a partial profile update; absent fields are left unchanged
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist or
    /// `ResourceAlreadyExists` on a username clash
    pub async fn update_profile(&self, user_id: Uuid, update: &UserProfileUpdate) -> AppResult<User> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                username = COALESCE($2, username),
                bio = COALESCE($3, bio),
                ava_id = COALESCE($4, ava_id),
                updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .bind(&update.username)
        .bind(&update.bio)
        .bind(update.ava_id.map(|id| id.to_string()))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        self.get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Number of users with the given role
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_by_role(&self, role: UserRole) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;
        Ok(row.get("count"))
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let role: String = row.get("role");
    let created_at: String = row.get("created_at");

    Ok(User {
        id: parse_uuid(&id)?,
        username: row.get("username"),
        email: row.get("email"),
        role: UserRole::parse(&role)
            .ok_or_else(|| AppError::internal(format!("Unknown user role '{role}'")))?,
        hashed_password: row.get("hashed_password"),
        is_active: row.get("is_active"),
        ava_id: parse_optional_uuid(row.get("ava_id"))?,
        bio: row.get("bio"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_optional_timestamp(row.get("updated_at"))?,
    })
}

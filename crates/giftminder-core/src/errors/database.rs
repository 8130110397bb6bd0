// ABOUTME: Conversion from sqlx errors into AppError
// ABOUTME: Unique-constraint violations become conflicts, missing rows become not-found
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        let mapped = match &error {
            sqlx::Error::RowNotFound => Self::new(ErrorCode::ResourceNotFound, "Record not found"),
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::new(
                ErrorCode::ResourceAlreadyExists,
                format!("Duplicate record: {}", db.message()),
            ),
            _ => Self::database(format!("Database operation failed: {error}")),
        };
        mapped.with_source(error)
    }
}

// ABOUTME: Axum IntoResponse integration for AppError
// ABOUTME: Renders the JSON error envelope with the status derived from the error code
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use super::{AppError, ErrorResponse};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                code = ?self.code,
                resource_id = ?self.resource_id,
                source = ?self.source,
                "{}",
                self.message
            );
        } else {
            tracing::debug!(code = ?self.code, "{}", self.message);
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

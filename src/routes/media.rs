// ABOUTME: Route handlers for multipart image uploads
// ABOUTME: Avatars take a single `file` part, content uploads take up to ten `files` parts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::extract::AppMultipart;
use crate::constants::media::{MAX_FILES_PER_UPLOAD, MAX_FILE_SIZE};
use crate::errors::{AppError, AppResult};
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use crate::services::UploadedFile;

/// Room for multipart boundaries and headers on top of the file payloads
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Parts of a multipart request relevant to uploads
#[derive(Debug, Default)]
struct UploadParts {
    files: Vec<UploadedFile>,
    alt: Option<String>,
}

async fn read_parts(mut multipart: Multipart, file_field: &str) -> AppResult<UploadParts> {
    let mut parts = UploadParts::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_input(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == file_field {
            let file_name = field.file_name().map(ToOwned::to_owned);
            let content_type = field.content_type().map(ToOwned::to_owned);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_input(format!("Failed to read '{name}': {e}")))?;
            parts.files.push(UploadedFile {
                file_name,
                content_type,
                data,
            });
        } else if name == "alt" {
            let alt = field
                .text()
                .await
                .map_err(|e| AppError::invalid_input(format!("Failed to read 'alt': {e}")))?;
            parts.alt = Some(alt).filter(|a| !a.trim().is_empty());
        } else {
            tracing::debug!(field = %name, "Ignoring unexpected multipart field");
        }
    }

    Ok(parts)
}

/// Media routes handler
pub struct MediaRoutes;

impl MediaRoutes {
    /// Create all media routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/media/upload/avatar", post(Self::handle_upload_avatar))
            .route("/media/upload/content", post(Self::handle_upload_content))
            .layer(DefaultBodyLimit::max(
                MAX_FILE_SIZE * MAX_FILES_PER_UPLOAD + MULTIPART_OVERHEAD,
            ))
            .with_state(resources)
    }

    /// Handle POST /media/upload/avatar
    async fn handle_upload_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppMultipart(multipart): AppMultipart,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let mut parts = read_parts(multipart, "file").await?;
        if parts.files.len() != 1 {
            return Err(AppError::media_validation(format!(
                "Expected exactly one 'file' part, got {}",
                parts.files.len()
            )));
        }
        let file = parts.files.remove(0);

        let media = resources
            .media_service()
            .upload_avatar(file, parts.alt)
            .await?;
        Ok((StatusCode::CREATED, Json(media)).into_response())
    }

    /// Handle POST /media/upload/content
    async fn handle_upload_content(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppMultipart(multipart): AppMultipart,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let parts = read_parts(multipart, "files").await?;

        let media = resources.media_service().upload_content(parts.files).await?;
        Ok((StatusCode::CREATED, Json(media)).into_response())
    }
}

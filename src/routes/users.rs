// ABOUTME: Route handlers for the authenticated user's own profile
// ABOUTME: GET and PATCH /users/me
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use giftminder_core::models::UserProfileUpdate;
use serde::Deserialize;
use uuid::Uuid;

use super::extract::AppJson;
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;

/// Body of `PATCH /users/me`
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New username
    pub username: Option<String>,
    /// New bio
    pub bio: Option<String>,
    /// Avatar media id
    pub ava_id: Option<Uuid>,
}

impl From<UpdateProfileRequest> for UserProfileUpdate {
    fn from(body: UpdateProfileRequest) -> Self {
        Self {
            username: body.username,
            bio: body.bio,
            ava_id: body.ava_id,
        }
    }
}

/// User profile routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/users/me", get(Self::handle_me).patch(Self::handle_update_me))
            .with_state(resources)
    }

    /// Handle GET /users/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Handle PATCH /users/me
    async fn handle_update_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppJson(body): AppJson<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let updated = resources
            .user_service()
            .update_profile(&user, &body.into())
            .await?;
        Ok((StatusCode::OK, Json(updated)).into_response())
    }
}

// ABOUTME: Route handlers for recipients: CRUD plus birthday changes
// ABOUTME: Users see their own recipients; admins see all of them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use giftminder_core::models::{nullable, NewRecipient, RecipientInfoUpdate};
use giftminder_core::pagination::{Pagination, PaginationQuery};
use giftminder_core::permissions::Actor;
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{AppJson, AppPath, AppQuery};
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;

/// Body of `POST /recipients`
#[derive(Debug, Deserialize)]
pub struct CreateRecipientRequest {
    /// Display name
    pub name: String,
    /// Date of birth
    pub birthday: NaiveDate,
    /// Relation to the caller
    pub relation: String,
    /// Gift preferences
    pub preferences: Option<Vec<String>>,
    /// Private notes
    pub notes: Option<String>,
}

impl From<CreateRecipientRequest> for NewRecipient {
    fn from(body: CreateRecipientRequest) -> Self {
        Self {
            name: body.name,
            birthday: body.birthday,
            relation: body.relation,
            preferences: body.preferences,
            notes: body.notes,
        }
    }
}

/// Body of `PATCH /recipients/:id`
#[derive(Debug, Deserialize)]
pub struct UpdateRecipientRequest {
    /// New name
    pub name: Option<String>,
    /// New relation
    pub relation: Option<String>,
    /// New preferences, `null` clears them
    #[serde(default, deserialize_with = "nullable")]
    pub preferences: Option<Option<Vec<String>>>,
    /// New notes, `null` clears them
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl From<UpdateRecipientRequest> for RecipientInfoUpdate {
    fn from(body: UpdateRecipientRequest) -> Self {
        Self {
            name: body.name,
            relation: body.relation,
            preferences: body.preferences,
            notes: body.notes,
        }
    }
}

/// Body of `POST /recipients/:id/set-birthday`
#[derive(Debug, Deserialize)]
pub struct SetBirthdayRequest {
    /// New date of birth
    pub birthday: NaiveDate,
}

/// Recipient routes handler
pub struct RecipientRoutes;

impl RecipientRoutes {
    /// Create all recipient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/recipients",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/recipients/:id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/recipients/:id/set-birthday",
                post(Self::handle_set_birthday),
            )
            .with_state(resources)
    }

    /// Handle GET /recipients
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppQuery(query): AppQuery<PaginationQuery>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let page = Pagination::try_from(query)?;
        let recipients = resources
            .recipient_service()
            .list(&Actor::from(&user), &page)
            .await?;
        Ok((StatusCode::OK, Json(recipients)).into_response())
    }

    /// Handle POST /recipients
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppJson(body): AppJson<CreateRecipientRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let recipient = resources
            .recipient_service()
            .create(&Actor::from(&user), body.into(), Utc::now().date_naive())
            .await?;
        Ok((StatusCode::CREATED, Json(recipient)).into_response())
    }

    /// Handle GET /recipients/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let recipient = resources
            .recipient_service()
            .get(&Actor::from(&user), id)
            .await?;
        Ok((StatusCode::OK, Json(recipient)).into_response())
    }

    /// Handle PATCH /recipients/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
        AppJson(body): AppJson<UpdateRecipientRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let recipient = resources
            .recipient_service()
            .update_info(&Actor::from(&user), id, &body.into())
            .await?;
        Ok((StatusCode::ACCEPTED, Json(recipient)).into_response())
    }

    /// Handle POST /recipients/:id/set-birthday
    async fn handle_set_birthday(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
        AppJson(body): AppJson<SetBirthdayRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let recipient = resources
            .recipient_service()
            .set_birthday(
                &Actor::from(&user),
                id,
                body.birthday,
                Utc::now().date_naive(),
            )
            .await?;
        Ok((StatusCode::ACCEPTED, Json(recipient)).into_response())
    }

    /// Handle DELETE /recipients/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources
            .recipient_service()
            .delete(&Actor::from(&user), id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

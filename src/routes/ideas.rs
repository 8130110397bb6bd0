// ABOUTME: Route handlers for gift ideas: own and global listings, CRUD and archiving
// ABOUTME: Listings filter on the archived flag, defaulting to active ideas
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
use giftminder_core::models::{nullable, GiftIdeaUpdate, IdeaScope, NewGiftIdea};
use giftminder_core::pagination::{Pagination, PaginationQuery};
use giftminder_core::permissions::Actor;
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{AppJson, AppPath, AppQuery};
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;

/// Body of `POST /ideas`
#[derive(Debug, Deserialize)]
pub struct CreateIdeaRequest {
    /// Short title
    pub title: String,
    /// Free-form tags
    pub tags: Option<Vec<String>>,
    /// Longer description
    pub description: Option<String>,
    /// Product link
    pub view_url: Option<String>,
    /// Estimated price
    pub estimated_price: Option<f64>,
    /// Visible to every user, admins only
    #[serde(default)]
    pub is_global: bool,
}

impl From<CreateIdeaRequest> for NewGiftIdea {
    fn from(body: CreateIdeaRequest) -> Self {
        Self {
            title: body.title,
            tags: body.tags,
            description: body.description,
            view_url: body.view_url,
            estimated_price: body.estimated_price,
            is_global: body.is_global,
        }
    }
}

/// Body of `PATCH /ideas/:id`
#[derive(Debug, Deserialize)]
pub struct UpdateIdeaRequest {
    /// New title
    pub title: Option<String>,
    /// New tags
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Option<Option<Vec<String>>>,
    /// New description
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    /// New product link
    #[serde(default, deserialize_with = "nullable")]
    pub view_url: Option<Option<String>>,
    /// New price
    #[serde(default, deserialize_with = "nullable")]
    pub estimated_price: Option<Option<f64>>,
}

impl From<UpdateIdeaRequest> for GiftIdeaUpdate {
    fn from(body: UpdateIdeaRequest) -> Self {
        Self {
            title: body.title,
            tags: body.tags,
            description: body.description,
            view_url: body.view_url,
            estimated_price: body.estimated_price,
        }
    }
}

/// Archive filter for listings
#[derive(Debug, Default, Deserialize)]
pub struct ArchivedQuery {
    /// List archived ideas instead of active ones
    #[serde(default)]
    pub archived: bool,
}

/// Gift idea routes handler
pub struct IdeaRoutes;

impl IdeaRoutes {
    /// Create all idea routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/ideas", post(Self::handle_create))
            .route("/ideas/my", get(Self::handle_list_my))
            .route("/ideas/global", get(Self::handle_list_global))
            .route(
                "/ideas/:id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/ideas/:id/archive", post(Self::handle_archive))
            .with_state(resources)
    }

    async fn list(
        resources: &ServerResources,
        headers: &HeaderMap,
        scope: IdeaScope,
        query: PaginationQuery,
        filter: ArchivedQuery,
    ) -> Result<Response, AppError> {
        let user = authenticate(headers, resources).await?;
        let page = Pagination::try_from(query)?;
        let ideas = resources
            .idea_service()
            .list(&Actor::from(&user), scope, filter.archived, &page)
            .await?;
        Ok((StatusCode::OK, Json(ideas)).into_response())
    }

    /// Handle GET /ideas/my - Ideas authored by the caller
    async fn handle_list_my(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppQuery(query): AppQuery<PaginationQuery>,
        AppQuery(filter): AppQuery<ArchivedQuery>,
    ) -> Result<Response, AppError> {
        Self::list(&resources, &headers, IdeaScope::Own, query, filter).await
    }

    /// Handle GET /ideas/global - Ideas curated by admins
    async fn handle_list_global(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppQuery(query): AppQuery<PaginationQuery>,
        AppQuery(filter): AppQuery<ArchivedQuery>,
    ) -> Result<Response, AppError> {
        Self::list(&resources, &headers, IdeaScope::Global, query, filter).await
    }

    /// Handle POST /ideas
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppJson(body): AppJson<CreateIdeaRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let idea = resources
            .idea_service()
            .create(&Actor::from(&user), body.into())
            .await?;
        Ok((StatusCode::CREATED, Json(idea)).into_response())
    }

    /// Handle GET /ideas/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let idea = resources
            .idea_service()
            .get(&Actor::from(&user), id)
            .await?;
        Ok((StatusCode::OK, Json(idea)).into_response())
    }

    /// Handle PATCH /ideas/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
        AppJson(body): AppJson<UpdateIdeaRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let idea = resources
            .idea_service()
            .update(&Actor::from(&user), id, body.into())
            .await?;
        Ok((StatusCode::ACCEPTED, Json(idea)).into_response())
    }

    /// Handle POST /ideas/:id/archive
    async fn handle_archive(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let idea = resources
            .idea_service()
            .archive(&Actor::from(&user), id)
            .await?;
        Ok((StatusCode::ACCEPTED, Json(idea)).into_response())
    }

    /// Handle DELETE /ideas/:id - Soft delete
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources
            .idea_service()
            .delete(&Actor::from(&user), id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

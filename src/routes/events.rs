// ABOUTME: Route handlers for events, their occurrences and the calendar view
// ABOUTME: Admins manage global events, users manage private ones
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
use chrono::{NaiveDate, Utc};
use giftminder_core::models::{EventType, EventUpdate, NewEvent};
use giftminder_core::pagination::{Pagination, PaginationQuery};
use giftminder_core::permissions::Actor;
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{AppJson, AppPath, AppQuery};
use crate::errors::AppError;
use crate::middleware::authenticate;
use crate::resources::ServerResources;
use crate::services::EventFull;

/// Body of `POST /events`
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    /// Short title
    pub title: String,
    /// Kind of event
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    /// Visible to every user, admins only
    #[serde(default)]
    pub is_global: bool,
    /// Repeats every year
    #[serde(default)]
    pub is_repeating: bool,
    /// First occurrence, today or later
    pub start_date: NaiveDate,
    /// Recipient the event is about
    pub recipient_id: Option<Uuid>,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(body: CreateEventRequest) -> Self {
        Self {
            title: body.title,
            event_type: body.event_type,
            is_global: body.is_global,
            is_repeating: body.is_repeating,
            start_date: body.start_date,
            recipient_id: body.recipient_id,
        }
    }
}

/// Body of `PATCH /events/:id`
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    /// New title
    pub title: Option<String>,
    /// New kind
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
}

/// Inclusive date range query
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// First day
    pub from_date: NaiveDate,
    /// Last day
    pub to_date: NaiveDate,
}

/// Event routes handler
pub struct EventRoutes;

impl EventRoutes {
    /// Create all event routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/events", get(Self::handle_list).post(Self::handle_create))
            .route("/events/occurrences", get(Self::handle_calendar))
            .route(
                "/events/:id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/events/:id/occurrences", get(Self::handle_occurrences))
            .with_state(resources)
    }

    /// Handle GET /events - Visible events with their next occurrence
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppQuery(query): AppQuery<PaginationQuery>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let page = Pagination::try_from(query)?;
        let events = resources
            .event_service()
            .list(&Actor::from(&user), &page, Utc::now().date_naive())
            .await?;
        Ok((StatusCode::OK, Json(events)).into_response())
    }

    /// Handle GET /events/occurrences - Calendar of visible occurrences
    async fn handle_calendar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppQuery(range): AppQuery<DateRangeQuery>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let calendar = resources
            .event_service()
            .calendar(&Actor::from(&user), range.from_date, range.to_date)
            .await?;
        Ok((StatusCode::OK, Json(calendar)).into_response())
    }

    /// Handle POST /events - Create an event and its first occurrence
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppJson(body): AppJson<CreateEventRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let (event, first) = resources
            .event_service()
            .create(&Actor::from(&user), body.into(), Utc::now().date_naive())
            .await?;

        let response = EventFull {
            event,
            occurrences: vec![first],
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /events/:id - Event with every occurrence
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let event = resources
            .event_service()
            .get_full(&Actor::from(&user), id)
            .await?;
        Ok((StatusCode::OK, Json(event)).into_response())
    }

    /// Handle PATCH /events/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
        AppJson(body): AppJson<UpdateEventRequest>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let update = EventUpdate {
            title: body.title,
            event_type: body.event_type,
        };
        let event = resources
            .event_service()
            .update(&Actor::from(&user), id, &update)
            .await?;
        Ok((StatusCode::ACCEPTED, Json(event)).into_response())
    }

    /// Handle DELETE /events/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources
            .event_service()
            .delete(&Actor::from(&user), id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /events/:id/occurrences
    async fn handle_occurrences(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppPath(id): AppPath<Uuid>,
        AppQuery(range): AppQuery<DateRangeQuery>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let occurrences = resources
            .event_service()
            .occurrences(&Actor::from(&user), id, range.from_date, range.to_date)
            .await?;
        Ok((StatusCode::OK, Json(occurrences)).into_response())
    }
}

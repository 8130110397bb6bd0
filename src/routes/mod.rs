// ABOUTME: Route module organization for the HTTP API
// ABOUTME: Assembles the versioned API router and the tower layers around it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the service layer.

/// Registration, login, refresh and activation
pub mod auth;
/// Events and calendar
pub mod events;
/// Extractors with enveloped rejections
pub mod extract;
/// Welcome and health check
pub mod health;
/// Gift ideas
pub mod ideas;
/// Image uploads
pub mod media;
/// Recipients
pub mod recipients;
/// Current user profile
pub mod users;

pub use auth::AuthRoutes;
pub use events::EventRoutes;
pub use health::HealthRoutes;
pub use ideas::IdeaRoutes;
pub use media::MediaRoutes;
pub use recipients::RecipientRoutes;
pub use users::UserRoutes;

use std::sync::Arc;

use axum::http::HeaderName;
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::constants::API_PREFIX;
use crate::middleware::setup_cors;
use crate::resources::ServerResources;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// The complete application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    let api = Router::new()
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(UserRoutes::routes(Arc::clone(&resources)))
        .merge(RecipientRoutes::routes(Arc::clone(&resources)))
        .merge(EventRoutes::routes(Arc::clone(&resources)))
        .merge(IdeaRoutes::routes(Arc::clone(&resources)))
        .merge(MediaRoutes::routes(Arc::clone(&resources)));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .nest(API_PREFIX, api)
        .layer(setup_cors(&resources.config.cors_allowed_origins))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

// ABOUTME: Route handlers for registration, login, token refresh and account activation
// ABOUTME: Thin axum handlers delegating to AuthService
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes
//!
//! Login follows the OAuth2 password form convention: the email goes in the
//! `username` field.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use giftminder_core::models::UserRole;
use serde::Deserialize;

use super::extract::{AppForm, AppJson, AppQuery};
use crate::errors::AppError;
use crate::middleware::require_root;
use crate::resources::ServerResources;
use crate::services::Registration;

/// Body of `POST /auth/register` and `POST /auth/register-admin`
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Unique display name
    pub username: String,
    /// Unique login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(body: RegisterRequest) -> Self {
        Self {
            username: body.username,
            email: body.email,
            password: body.password,
        }
    }
}

/// OAuth2 password form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// The account email
    pub username: String,
    /// Plain-text password
    pub password: String,
}

/// Body of `POST /auth/refresh`
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// A refresh token from a previous login
    pub refresh_token: String,
}

/// Query of `GET /auth/activate`
#[derive(Debug, Deserialize)]
pub struct ActivateQuery {
    /// Activation token from the email link
    pub token: String,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/auth/register", post(Self::handle_register))
            .route("/auth/register-admin", post(Self::handle_register_admin))
            .route("/auth/login", post(Self::handle_login))
            .route("/auth/refresh", post(Self::handle_refresh))
            .route("/auth/activate", get(Self::handle_activate))
            .with_state(resources)
    }

    /// Handle POST /auth/register - Create an inactive account and send the activation email
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        AppJson(body): AppJson<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let registration = Registration::from(body);
        let user = resources
            .auth_service()
            .register_user(&registration, &resources.activation_notifier())
            .await?;

        Ok((StatusCode::CREATED, Json(user)).into_response())
    }

    /// Handle POST /auth/register-admin - Root creates an active admin
    async fn handle_register_admin(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        AppJson(body): AppJson<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let root = require_root(&headers, &resources).await?;
        let registration = Registration::from(body);
        let admin = resources
            .auth_service()
            .register(&registration, UserRole::Admin, true)
            .await?;
        tracing::info!(admin_id = %admin.id, created_by = %root.id, "Admin registered");

        Ok((StatusCode::CREATED, Json(admin)).into_response())
    }

    /// Handle POST /auth/login - Exchange credentials for a token pair
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        AppForm(form): AppForm<LoginForm>,
    ) -> Result<Response, AppError> {
        let tokens = resources
            .auth_service()
            .login(&form.username, &form.password)
            .await?;

        Ok((StatusCode::OK, Json(tokens)).into_response())
    }

    /// Handle POST /auth/refresh - Rotate a token pair
    async fn handle_refresh(
        State(resources): State<Arc<ServerResources>>,
        AppJson(body): AppJson<RefreshRequest>,
    ) -> Result<Response, AppError> {
        let tokens = resources
            .auth_service()
            .refresh(&body.refresh_token)
            .await?;

        Ok((StatusCode::OK, Json(tokens)).into_response())
    }

    /// Handle GET /auth/activate - Follow the emailed activation link
    async fn handle_activate(
        State(resources): State<Arc<ServerResources>>,
        AppQuery(query): AppQuery<ActivateQuery>,
    ) -> Result<Response, AppError> {
        let user = resources.auth_service().activate(&query.token).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }
}

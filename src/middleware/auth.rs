// ABOUTME: Bearer token authentication for HTTP handlers
// ABOUTME: Extracts the Authorization header and resolves it to an active user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::http::HeaderMap;
use giftminder_core::models::User;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// Token from an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// Returns `AuthRequired` when the header is absent and `AuthInvalid` when it
/// is not a bearer credential
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(AppError::auth_required)?
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::auth_invalid("Authorization header must be 'Bearer <token>'"))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AppError::auth_invalid(
            "Authorization header must be 'Bearer <token>'",
        ));
    }
    Ok(token.trim())
}

/// Resolve the request's access token to an active user
///
/// # Errors
///
/// Returns an authentication error for missing, expired or invalid tokens and
/// for inactive or deleted accounts
#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
pub async fn authenticate(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
    let token = bearer_token(headers)?;
    match resources.auth_service().authenticate(token).await {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.id.to_string());
            Ok(user)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Authentication failed");
            Err(e)
        }
    }
}

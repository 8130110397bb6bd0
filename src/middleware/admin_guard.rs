// ABOUTME: Role guards for routes restricted to administrators or the root account
// ABOUTME: Authenticates the caller and returns 403 Access denied when the role is insufficient
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Role guards
//!
//! Handlers call these instead of repeating inline role checks:
//!
//! ```rust,no_run
//! use axum::http::HeaderMap;
//! use giftminder_server::errors::AppError;
//! use giftminder_server::middleware::admin_guard::require_root;
//! use giftminder_server::resources::ServerResources;
//!
//! async fn root_only(headers: HeaderMap, resources: &ServerResources) -> Result<String, AppError> {
//!     let root = require_root(&headers, resources).await?;
//!     Ok(format!("Hello {}", root.username))
//! }
//! ```

use axum::http::HeaderMap;
use giftminder_core::models::{User, UserRole};

use super::auth::authenticate;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// Authenticate and require `ADMIN` or `ROOT`
///
/// # Errors
///
/// Returns an authentication error, or `PermissionDenied` for plain users
pub async fn require_admin(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
    let user = authenticate(headers, resources).await?;
    if !user.is_admin() {
        tracing::warn!(user_id = %user.id, "Admin route refused");
        return Err(AppError::forbidden());
    }
    Ok(user)
}

/// Authenticate and require `ROOT`
///
/// # Errors
///
/// Returns an authentication error, or `PermissionDenied` for anyone else
pub async fn require_root(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
    let user = authenticate(headers, resources).await?;
    if user.role != UserRole::Root {
        tracing::warn!(user_id = %user.id, role = user.role.as_str(), "Root route refused");
        return Err(AppError::forbidden());
    }
    Ok(user)
}

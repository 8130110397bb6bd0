// ABOUTME: HTTP middleware for authentication, role guards and CORS
// ABOUTME: Handlers call the guards explicitly; CORS is applied as a tower layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Role guards for admin and root routes
pub mod admin_guard;
/// Bearer token authentication
pub mod auth;
/// CORS layer
pub mod cors;

pub use admin_guard::{require_admin, require_root};
pub use auth::{authenticate, bearer_token};
pub use cors::setup_cors;

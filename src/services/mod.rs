// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Services combine managers, policies and validation and are shared by HTTP routes and the admin CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Handlers parse requests and render responses; everything in between lives
//! here. Services are built from database managers and shared components, so
//! the admin CLI can use them without a running HTTP server.

/// Registration, login, token refresh and activation
pub mod auth;

/// Events, occurrences and the calendar view
pub mod events;

/// Gift ideas
pub mod ideas;

/// Image uploads
pub mod media;

/// Recipients
pub mod recipients;

/// Profile updates
pub mod users;

pub use auth::{ActivationNotifier, AuthService, Registration};
pub use events::{Calendar, EventFull, EventNext, EventService};
pub use ideas::IdeaService;
pub use media::{MediaService, UploadedFile};
pub use recipients::RecipientService;
pub use users::UserService;

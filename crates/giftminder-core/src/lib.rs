// ABOUTME: Core types and rules for the Giftminder reminder service
// ABOUTME: Foundation crate with errors, models, access policies, recurrence and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Giftminder Core
//!
//! Foundation crate shared by the server, its binaries and its tests. It has
//! no I/O: everything here is data, predicates and arithmetic, so it changes
//! rarely and compiles once per workspace build.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the JSON error envelope
//! - **models**: users, recipients, events, occurrences, gift ideas, media
//! - **permissions**: per-entity access policies keyed on role and ownership
//! - **recurrence**: yearly anniversary arithmetic for repeating events
//! - **pagination**: bounded offset pagination with whitelisted ordering
//! - **validation**: field rules shared by every write path

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and limits
pub mod constants;

/// Domain data models
pub mod models;

/// Role and ownership based access policies
pub mod permissions;

/// Yearly recurrence arithmetic
pub mod recurrence;

/// Offset pagination
pub mod pagination;

/// Field validation rules
pub mod validation;

// ABOUTME: Main library entry point for the Giftminder reminder server
// ABOUTME: HTTP API, persistence, object storage, mail and the daily occurrence scheduler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Giftminder Server
//!
//! A gift and event reminder service. Users keep a list of recipients, attach
//! yearly events to them, collect gift ideas and upload pictures. A daily job
//! materialises the yearly occurrences of repeating events so calendar
//! queries stay plain range scans.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers under `/api/v1`
//! - **Services**: validation and access policies around each use case
//! - **Database**: per-entity managers over a shared `SQLite` pool
//! - **Storage / Mail**: pluggable backends behind async traits
//! - **Scheduler**: single-instance daily occurrence generator
//!
//! ```rust,no_run
//! use giftminder_server::config::ServerConfig;
//! use giftminder_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("{}", config.summary());
//!     Ok(())
//! }
//! ```

/// JWT issuing and validation, password hashing
pub mod auth;

/// Configuration loaded from the environment
pub mod config;

/// Application constants and configuration defaults
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Outgoing mail
pub mod mail;

/// Authentication and role guards for handlers
pub mod middleware;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Daily occurrence generator
pub mod scheduler;

/// Domain service layer
pub mod services;

/// Object storage for uploaded media
pub mod storage;

pub use giftminder_core::{models, pagination, permissions, recurrence, validation};

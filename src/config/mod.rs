// ABOUTME: Configuration module for server settings loaded from the environment
// ABOUTME: Re-exports the typed ServerConfig and its sub-configurations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, DatabaseConfig, Environment, LogLevel, MailConfig, S3Config, SchedulerConfig,
    ServerConfig, StorageConfig,
};

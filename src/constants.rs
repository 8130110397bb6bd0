// ABOUTME: Server-side constants: environment variable names and configuration defaults
// ABOUTME: Domain limits live in giftminder-core and are re-exported here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use giftminder_core::constants::{limits, media, pagination, root_user, tokens};

/// Environment variable names
pub mod env_vars {
    /// Application display name
    pub const APP_NAME: &str = "APP_NAME";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Log level used when `RUST_LOG` is unset
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    /// Bind host
    pub const HOST: &str = "HOST";
    /// Bind port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// sqlx database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Pool size
    pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
    /// HMAC secret for JWTs
    pub const JWT_SECRET_KEY: &str = "JWT_SECRET_KEY";
    /// HMAC algorithm
    pub const JWT_ALGORITHM: &str = "JWT_ALGORITHM";
    /// Access token lifetime
    pub const ACCESS_TOKEN_EXPIRE_MINUTES: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";
    /// Refresh token lifetime
    pub const REFRESH_TOKEN_EXPIRE_DAYS: &str = "REFRESH_TOKEN_EXPIRE_DAYS";
    /// Activation token lifetime
    pub const ACTIVATION_TOKEN_EXPIRE_HOURS: &str = "ACTIVATION_TOKEN_EXPIRE_HOURS";
    /// Bcrypt work factor
    pub const BCRYPT_COST: &str = "BCRYPT_COST";
    /// `s3` or `memory`
    pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
    /// S3 access key id
    pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
    /// S3 secret key
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    /// S3 region
    pub const AWS_REGION: &str = "AWS_REGION";
    /// S3 bucket
    pub const AWS_BUCKET_NAME: &str = "AWS_BUCKET_NAME";
    /// Custom S3 endpoint
    pub const AWS_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";
    /// URL prefix for the in-memory store
    pub const MEDIA_PUBLIC_BASE_URL: &str = "MEDIA_PUBLIC_BASE_URL";
    /// Send real mail
    pub const MAIL_ENABLED: &str = "MAIL_ENABLED";
    /// SendGrid API key
    pub const MAIL_SENDGRID_API_KEY: &str = "MAIL_SENDGRID_API_KEY";
    /// Sender address
    pub const MAIL_SENDER_EMAIL: &str = "MAIL_SENDER_EMAIL";
    /// Activation link prefix
    pub const ACTIVATION_URL_BASE: &str = "ACTIVATION_URL_BASE";
    /// Enable the daily occurrence job
    pub const SCHEDULER_ENABLED: &str = "SCHEDULER_ENABLED";
    /// Run the occurrence job at boot
    pub const SCHEDULER_RUN_ON_STARTUP: &str = "SCHEDULER_RUN_ON_STARTUP";
    /// Comma separated CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
}

/// Configuration defaults
pub mod defaults {
    /// Application display name
    pub const APP_NAME: &str = "Giftminder";
    /// Bind host
    pub const HOST: &str = "0.0.0.0";
    /// Bind port
    pub const HTTP_PORT: u16 = 8080;
    /// Database URL
    pub const DATABASE_URL: &str = "sqlite:./data/giftminder.db";
    /// Pool size
    pub const MAX_CONNECTIONS: u32 = 10;
    /// S3 region
    pub const AWS_REGION: &str = "eu-central-1";
    /// URL prefix for the in-memory store
    pub const MEDIA_PUBLIC_BASE_URL: &str = "http://localhost:8080/media";
    /// Activation link prefix
    pub const ACTIVATION_URL_BASE: &str = "http://localhost:8080/api/v1/auth/activate";
}

/// API prefix shared by every versioned route
pub const API_PREFIX: &str = "/api/v1";

/// Service name used in logs
pub const SERVICE_NAME: &str = "giftminder-server";

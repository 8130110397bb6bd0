// ABOUTME: Unified error type, error codes and HTTP error envelope for Giftminder
// ABOUTME: Maps domain failures (auth, policy, validation, conflicts) to status codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every fallible operation in the workspace returns [`AppResult`]. An
//! [`AppError`] carries a stable [`ErrorCode`] (serialised in the JSON error
//! envelope), a human-readable message and optional structured details.
//! The HTTP status is derived from the code, never chosen at the call site.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "http-response")]
mod http_response;

#[cfg(feature = "database-errors")]
mod database;

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization (1000-1999)
    /// No bearer token was supplied
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 1000,
    /// Credentials or token were rejected
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,
    /// Token signature was valid but the token has expired
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired = 1002,
    /// Token could not be decoded at all
    #[serde(rename = "AUTH_MALFORMED")]
    AuthMalformed = 1003,
    /// Role or ownership check failed
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1004,
    /// Account exists but has not been activated yet
    #[serde(rename = "USER_NOT_ACTIVATED")]
    UserNotActivated = 1005,

    // Validation (3000-3999)
    /// Request body or query failed validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field was absent
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// A field had the wrong shape (date, URL, MIME type)
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,
    /// A numeric or length bound was violated
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// Entity does not exist or is soft-deleted
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Unique key (email, username) already in use
    #[serde(rename = "RESOURCE_ALREADY_EXISTS")]
    ResourceAlreadyExists = 4001,
    /// State transition not allowed (already activated)
    #[serde(rename = "RESOURCE_CONFLICT")]
    ResourceConflict = 4002,

    // External Services (5000-5999)
    /// Upstream HTTP service (mail provider) failed
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// Object storage failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 5001,

    // Configuration (6000-6999)
    /// Generic configuration error
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required environment variable is unset
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    /// Environment variable could not be parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Database query failed
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// JSON encoding or decoding failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::ValueOutOfRange => 400,

            // 401 Unauthorized
            Self::AuthRequired
            | Self::AuthInvalid
            | Self::AuthExpired
            | Self::AuthMalformed
            | Self::UserNotActivated => 401,

            // 403 Forbidden
            Self::PermissionDenied => 403,

            // 404 Not Found
            Self::ResourceNotFound => 404,

            // 409 Conflict
            Self::ResourceAlreadyExists | Self::ResourceConflict => 409,

            // 502 Bad Gateway
            Self::ExternalServiceError | Self::StorageError => 502,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigError
            | Self::ConfigMissing
            | Self::ConfigInvalid => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::AuthExpired => "The authentication token has expired",
            Self::AuthMalformed => "The authentication token is malformed",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::UserNotActivated => "The account has not been activated",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ResourceConflict => "The resource is not in a state that allows this action",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::StorageError => "Object storage operation failed",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details included in the response envelope
    pub details: serde_json::Value,
    /// Identifier of the entity the error refers to, for logs
    pub resource_id: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            resource_id: None,
            source: None,
        }
    }

    /// Attach structured details to the error
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Attach the id of the entity involved
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error body
    pub error: ErrorResponseDetails,
}

/// Body of the error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                details: error.details,
            },
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Not authenticated")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Token has expired
    #[must_use]
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Token expired")
    }

    /// Token could not be decoded or has the wrong type
    pub fn token_invalid(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthMalformed, "Invalid token")
            .with_details(serde_json::json!({ "reason": reason.into() }))
    }

    /// Login with an unknown email or wrong password
    #[must_use]
    pub fn wrong_credentials() -> Self {
        Self::new(ErrorCode::AuthInvalid, "Incorrect credentials")
    }

    /// Login attempt by an account that was never activated
    pub fn user_not_activated(username: &str) -> Self {
        Self::new(
            ErrorCode::UserNotActivated,
            format!("user '{username}' is not activated"),
        )
    }

    /// Activation attempt by an account that is already active
    pub fn user_already_activated(username: &str) -> Self {
        Self::new(
            ErrorCode::ResourceConflict,
            format!("user '{username}' is already activated"),
        )
    }

    /// Role or ownership check failed
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(ErrorCode::PermissionDenied, "Access denied")
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Email address already registered
    pub fn email_taken(email: &str) -> Self {
        Self::new(
            ErrorCode::ResourceAlreadyExists,
            format!("email '{email}' is already taken"),
        )
    }

    /// Username already registered
    pub fn username_taken(username: &str) -> Self {
        Self::new(
            ErrorCode::ResourceAlreadyExists,
            format!("username '{username}' is already taken"),
        )
    }

    /// Event start date lies before today
    #[must_use]
    pub fn past_event(today: NaiveDate) -> Self {
        Self::new(
            ErrorCode::InvalidInput,
            format!("Event cannot be created before {today}"),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Uploaded file is not an acceptable image
    pub fn media_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    /// A bound on length, count or size was violated
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValueOutOfRange, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Object storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Required configuration value is missing
    pub fn config_missing(variable: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            format!("{variable} environment variable is required"),
        )
    }

    /// Configuration value could not be parsed
    pub fn config_invalid(variable: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConfigInvalid,
            format!("Invalid value for {variable}: {reason}"),
        )
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.source() {
            Some(source) => Self::new(ErrorCode::InternalError, error.to_string())
                .with_details(serde_json::json!({ "source": source.to_string() })),
            None => Self::new(ErrorCode::InternalError, error.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::SerializationError,
            format!("JSON processing failed: {error}"),
        )
    }
}

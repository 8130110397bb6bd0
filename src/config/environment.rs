// ABOUTME: Environment configuration for the Giftminder server
// ABOUTME: Parses typed settings for HTTP, database, JWT, storage, mail and scheduler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration.
//!
//! All settings come from environment variables. Parsing is done against a
//! lookup function so tests can build configurations without touching the
//! process environment.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use tracing::info;

use crate::constants::{defaults, env_vars};
use crate::errors::{AppError, AppResult};
use giftminder_core::constants::tokens;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(name)
    }
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    pub url: String,
    /// Pool size
    pub max_connections: u32,
}

/// JWT and password hashing settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret shared by every token type
    pub jwt_secret: String,
    /// HMAC variant
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime
    pub access_token_expire_minutes: i64,
    /// Refresh token lifetime
    pub refresh_token_expire_days: i64,
    /// Activation token lifetime
    pub activation_token_expire_hours: i64,
    /// Bcrypt work factor
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("refresh_token_expire_days", &self.refresh_token_expire_days)
            .field(
                "activation_token_expire_hours",
                &self.activation_token_expire_hours,
            )
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// S3 bucket settings
#[derive(Clone)]
pub struct S3Config {
    /// Access key id
    pub access_key: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket region
    pub region: String,
    /// Bucket name
    pub bucket: String,
    /// Custom endpoint for S3-compatible stores, enables path-style addressing
    pub endpoint_url: Option<String>,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("access_key", &self.access_key)
            .field("secret_access_key", &"[REDACTED]")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Where uploaded media is stored
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Amazon S3 or a compatible service
    S3(S3Config),
    /// Process memory, for development and tests
    Memory {
        /// Prefix of generated public URLs
        public_base_url: String,
    },
}

/// Outgoing mail settings
#[derive(Clone)]
pub struct MailConfig {
    /// Send through SendGrid when true, log only otherwise
    pub enabled: bool,
    /// SendGrid API key
    pub sendgrid_api_key: Option<String>,
    /// From address
    pub sender_email: Option<String>,
    /// Link prefix for activation emails
    pub activation_url_base: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("enabled", &self.enabled)
            .field(
                "sendgrid_api_key",
                &self.sendgrid_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sender_email", &self.sender_email)
            .field("activation_url_base", &self.activation_url_base)
            .finish()
    }
}

/// Background occurrence generator settings
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Run the daily job
    pub enabled: bool,
    /// Run once immediately at startup
    pub run_on_startup: bool,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Application display name
    pub app_name: String,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Bind host
    pub host: String,
    /// Bind port
    pub http_port: u16,
    /// Database settings
    pub database: DatabaseConfig,
    /// Token and password settings
    pub auth: AuthConfig,
    /// Media storage backend
    pub storage: StorageConfig,
    /// Outgoing mail
    pub mail: MailConfig,
    /// Occurrence generator
    pub scheduler: SchedulerConfig,
    /// Allowed CORS origins, `*` for any
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when a required variable is unset and
    /// `ConfigInvalid` when a value cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a map of variables
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`]
    pub fn from_map(vars: &HashMap<String, String>) -> AppResult<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let environment = Environment::from_str_or_default(
            &vars.or(env_vars::ENVIRONMENT, "development"),
        );

        let config = Self {
            app_name: vars.or(env_vars::APP_NAME, defaults::APP_NAME),
            environment,
            log_level: LogLevel::from_str_or_default(&vars.or(env_vars::LOG_LEVEL, "info")),
            host: vars.or(env_vars::HOST, defaults::HOST),
            http_port: vars.parse_or(env_vars::HTTP_PORT, defaults::HTTP_PORT)?,
            database: DatabaseConfig {
                url: vars.or(env_vars::DATABASE_URL, defaults::DATABASE_URL),
                max_connections: vars
                    .parse_or(env_vars::DATABASE_MAX_CONNECTIONS, defaults::MAX_CONNECTIONS)?,
            },
            auth: AuthConfig {
                jwt_secret: vars.required(env_vars::JWT_SECRET_KEY)?,
                jwt_algorithm: parse_hmac_algorithm(&vars.or(env_vars::JWT_ALGORITHM, "HS256"))?,
                access_token_expire_minutes: vars.parse_or(
                    env_vars::ACCESS_TOKEN_EXPIRE_MINUTES,
                    tokens::ACCESS_TOKEN_EXPIRE_MINUTES,
                )?,
                refresh_token_expire_days: vars.parse_or(
                    env_vars::REFRESH_TOKEN_EXPIRE_DAYS,
                    tokens::REFRESH_TOKEN_EXPIRE_DAYS,
                )?,
                activation_token_expire_hours: vars.parse_or(
                    env_vars::ACTIVATION_TOKEN_EXPIRE_HOURS,
                    tokens::ACTIVATION_TOKEN_EXPIRE_HOURS,
                )?,
                bcrypt_cost: vars.parse_or(env_vars::BCRYPT_COST, bcrypt::DEFAULT_COST)?,
            },
            storage: Self::storage_from(&vars)?,
            mail: Self::mail_from(&vars)?,
            scheduler: SchedulerConfig {
                enabled: vars.parse_or(env_vars::SCHEDULER_ENABLED, true)?,
                run_on_startup: vars.parse_or(env_vars::SCHEDULER_RUN_ON_STARTUP, true)?,
            },
            cors_allowed_origins: parse_origins(&vars.or(env_vars::CORS_ALLOWED_ORIGINS, "*")),
        };

        config.validate()?;
        Ok(config)
    }

    fn storage_from<F>(vars: &Vars<F>) -> AppResult<StorageConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        match vars.or(env_vars::STORAGE_BACKEND, "s3").to_lowercase().as_str() {
            "s3" => Ok(StorageConfig::S3(S3Config {
                access_key: vars.required(env_vars::AWS_ACCESS_KEY)?,
                secret_access_key: vars.required(env_vars::AWS_SECRET_ACCESS_KEY)?,
                region: vars.or(env_vars::AWS_REGION, defaults::AWS_REGION),
                bucket: vars.required(env_vars::AWS_BUCKET_NAME)?,
                endpoint_url: vars.optional(env_vars::AWS_ENDPOINT_URL),
            })),
            "memory" => Ok(StorageConfig::Memory {
                public_base_url: vars.or(
                    env_vars::MEDIA_PUBLIC_BASE_URL,
                    defaults::MEDIA_PUBLIC_BASE_URL,
                ),
            }),
            other => Err(AppError::config_invalid(
                env_vars::STORAGE_BACKEND,
                format!("unknown backend '{other}', expected 's3' or 'memory'"),
            )),
        }
    }

    fn mail_from<F>(vars: &Vars<F>) -> AppResult<MailConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled: bool = vars.parse_or(env_vars::MAIL_ENABLED, false)?;
        let (sendgrid_api_key, sender_email) = if enabled {
            (
                Some(vars.required(env_vars::MAIL_SENDGRID_API_KEY)?),
                Some(vars.required(env_vars::MAIL_SENDER_EMAIL)?),
            )
        } else {
            (
                vars.optional(env_vars::MAIL_SENDGRID_API_KEY),
                vars.optional(env_vars::MAIL_SENDER_EMAIL),
            )
        };

        Ok(MailConfig {
            enabled,
            sendgrid_api_key,
            sender_email,
            activation_url_base: vars.or(
                env_vars::ACTIVATION_URL_BASE,
                defaults::ACTIVATION_URL_BASE,
            ),
        })
    }

    /// Cross-field checks
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for non-positive token lifetimes or an
    /// out-of-range bcrypt cost
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::config_invalid(
                env_vars::JWT_SECRET_KEY,
                "must not be empty",
            ));
        }
        if self.auth.access_token_expire_minutes <= 0
            || self.auth.refresh_token_expire_days <= 0
            || self.auth.activation_token_expire_hours <= 0
        {
            return Err(AppError::config_invalid(
                "token lifetime",
                "token lifetimes must be positive",
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(AppError::config_invalid(
                env_vars::BCRYPT_COST,
                "must be between 4 and 31",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::config_invalid(
                env_vars::DATABASE_MAX_CONNECTIONS,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} Configuration:\n\
             - Environment: {}\n\
             - Bind: {}:{}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - JWT Algorithm: {:?}\n\
             - Storage: {}\n\
             - Mail: {}\n\
             - Scheduler: {}",
            self.app_name,
            self.environment,
            self.host,
            self.http_port,
            self.log_level,
            redact_database_url(&self.database.url),
            self.auth.jwt_algorithm,
            match &self.storage {
                StorageConfig::S3(s3) => format!("S3 bucket '{}' ({})", s3.bucket, s3.region),
                StorageConfig::Memory { .. } => "in-memory".to_owned(),
            },
            if self.mail.enabled { "SendGrid" } else { "log only" },
            if self.scheduler.enabled {
                "daily at 00:00 UTC"
            } else {
                "disabled"
            },
        )
    }
}

/// Typed access to a variable lookup
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_owned())
    }

    fn required(&self, key: &str) -> AppResult<String> {
        self.optional(key)
            .ok_or_else(|| AppError::config_missing(key))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> AppResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::config_invalid(key, e))
        })
    }
}

/// Only HMAC algorithms are supported since tokens are signed with a shared secret
fn parse_hmac_algorithm(value: &str) -> AppResult<Algorithm> {
    match value.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AppError::config_invalid(
            env_vars::JWT_ALGORITHM,
            format!("unsupported algorithm '{other}'"),
        )),
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Hide credentials embedded in a database URL
fn redact_database_url(url: &str) -> String {
    match url.split_once('@') {
        Some((_, host)) => format!("***@{host}"),
        None => url.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        [
            ("JWT_SECRET_KEY", "test-secret"),
            ("STORAGE_BACKEND", "memory"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_map(&base_vars()).unwrap();
        assert_eq!(config.app_name, "Giftminder");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.auth.jwt_algorithm, Algorithm::HS256);
        assert_eq!(config.auth.access_token_expire_minutes, 15);
        assert_eq!(config.auth.refresh_token_expire_days, 30);
        assert_eq!(config.auth.activation_token_expire_hours, 24);
        assert!(!config.mail.enabled);
        assert!(config.scheduler.enabled);
        assert_eq!(config.cors_allowed_origins, vec!["*".to_owned()]);
        assert!(matches!(config.storage, StorageConfig::Memory { .. }));
    }

    #[test]
    fn test_missing_secret() {
        let mut vars = base_vars();
        vars.remove("JWT_SECRET_KEY");
        let err = ServerConfig::from_map(&vars).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ConfigMissing);
    }

    #[test]
    fn test_s3_requires_bucket() {
        let mut vars = base_vars();
        vars.insert("STORAGE_BACKEND".to_owned(), "s3".to_owned());
        vars.insert("AWS_ACCESS_KEY".to_owned(), "key".to_owned());
        vars.insert("AWS_SECRET_ACCESS_KEY".to_owned(), "secret".to_owned());
        assert!(ServerConfig::from_map(&vars).is_err());

        vars.insert("AWS_BUCKET_NAME".to_owned(), "gifts".to_owned());
        let config = ServerConfig::from_map(&vars).unwrap();
        assert!(matches!(
            &config.storage,
            StorageConfig::S3(s3) if s3.bucket == "gifts" && s3.region == "eu-central-1"
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = base_vars();
        vars.insert("HTTP_PORT".to_owned(), "not-a-port".to_owned());
        let err = ServerConfig::from_map(&vars).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ConfigInvalid);

        let mut vars = base_vars();
        vars.insert("JWT_ALGORITHM".to_owned(), "RS256".to_owned());
        assert!(ServerConfig::from_map(&vars).is_err());

        let mut vars = base_vars();
        vars.insert("MAIL_ENABLED".to_owned(), "true".to_owned());
        assert!(ServerConfig::from_map(&vars).is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*".to_owned()]);
        assert_eq!(
            parse_origins("http://a.test, http://b.test,"),
            vec!["http://a.test".to_owned(), "http://b.test".to_owned()]
        );
    }

    #[test]
    fn test_summary_hides_secrets() {
        let config = ServerConfig::from_map(&base_vars()).unwrap();
        let summary = config.summary();
        assert!(!summary.contains("test-secret"));
        assert!(format!("{:?}", config.auth).contains("[REDACTED]"));
    }
}

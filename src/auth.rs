// ABOUTME: JWT issuance and validation plus bcrypt password hashing
// ABOUTME: Issues access, refresh and activation tokens signed with a shared HMAC secret
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! Three token types share one secret and are told apart by the `type`
//! claim:
//!
//! - **access**: short lived, carries `id`, `sub` (email) and `role`
//! - **refresh**: long lived, carries `id` only, exchanged for a new pair
//! - **activation**: sent by email after registration, carries `id` only
//!
//! A token presented where another type is expected is rejected as invalid.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::errors::{AppError, AppResult};
use giftminder_core::models::{User, UserRole};

/// Plain text behind the decoy hash checked for unknown login emails
const DECOY_PASSWORD: &str = "giftminder-login-decoy";

/// Purpose of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Bearer token for API calls
    Access,
    /// Token exchanged for a new pair
    Refresh,
    /// One-time account activation
    Activation,
}

impl TokenType {
    /// Wire name of the token type
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Activation => "activation",
        }
    }
}

/// `JWT` claims shared by every token type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub id: Uuid,
    /// User email, access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// User role, access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Token purpose
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id
    pub jti: Uuid,
}

/// Access and refresh token returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token for API calls
    pub access_token: String,
    /// Token for `POST /auth/refresh`
    pub refresh_token: String,
    /// Always `bearer`
    pub token_type: String,
}

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired,
    /// Token signature or claims are invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired => write!(f, "JWT token has expired"),
            Self::TokenInvalid { reason } => write!(f, "JWT token is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired => Self::token_expired(),
            JwtValidationError::TokenInvalid { reason } => Self::token_invalid(reason),
            JwtValidationError::TokenMalformed { details } => Self::token_invalid(details),
        }
    }
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
    activation_ttl: Duration,
    bcrypt_cost: u32,
    decoy_hash: Arc<OnceCell<String>>,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm: config.jwt_algorithm,
            access_ttl: Duration::minutes(config.access_token_expire_minutes),
            refresh_ttl: Duration::days(config.refresh_token_expire_days),
            activation_ttl: Duration::hours(config.activation_token_expire_hours),
            bcrypt_cost: config.bcrypt_cost,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    fn lifetime(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
            TokenType::Activation => self.activation_ttl,
        }
    }

    /// Sign a token of the given type for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user: &User, token_type: TokenType) -> AppResult<String> {
        self.generate_token_at(user, token_type, Utc::now())
    }

    fn generate_token_at(
        &self,
        user: &User,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let expiry = now + self.lifetime(token_type);
        let is_access = token_type == TokenType::Access;

        let claims = Claims {
            id: user.id,
            sub: is_access.then(|| user.email.clone()),
            role: is_access.then_some(user.role),
            token_type,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign {} token: {e}", token_type.as_str())))
    }

    /// Issue a fresh access/refresh pair
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token_pair(&self, user: &User) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.generate_token(user, TokenType::Access)?,
            refresh_token: self.generate_token(user, TokenType::Refresh)?,
            token_type: "bearer".to_owned(),
        })
    }

    /// Decode a token and check it has the expected type
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is expired, has a bad
    /// signature, cannot be decoded or is of another type
    pub fn validate_token(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))?;

        if claims.token_type != expected {
            tracing::warn!(
                user_id = %claims.id,
                "Rejected {} token where {} token was expected",
                claims.token_type.as_str(),
                expected.as_str()
            );
            return Err(JwtValidationError::TokenInvalid {
                reason: format!("expected {} token", expected.as_str()),
            });
        }

        Ok(claims)
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::debug!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired,
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::MissingRequiredClaim(claim) => JwtValidationError::TokenInvalid {
                reason: format!("Token is missing required claim '{claim}'"),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid claims: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Hash a password with bcrypt off the async executor
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(&password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing error: {e}")))
    }

    /// Verify a password against a bcrypt hash off the async executor
    ///
    /// A malformed stored hash counts as a mismatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocking task panics
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
    }

    /// Spend the same bcrypt work as a real check when no account matches
    ///
    /// The decoy hash is built once at the configured cost. Always yields `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing the decoy fails or the blocking task panics
    pub async fn verify_decoy_password(&self, password: &str) -> AppResult<bool> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD))
            .await?;
        self.verify_password(password, decoy).await?;
        Ok(false)
    }
}

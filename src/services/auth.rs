// ABOUTME: Account registration, login, token refresh and activation
// ABOUTME: Enforces credential checks and the inactive-until-activated rule for self-registered users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use giftminder_core::models::{User, UserRole};
use giftminder_core::validation::{validate_email, validate_password, validate_username};

use crate::auth::{AuthManager, TokenPair, TokenType};
use crate::database::UsersManager;
use crate::errors::{AppError, AppResult};
use crate::mail::{activation_email, MailSender};

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    /// Unique display name
    pub username: String,
    /// Unique login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
}

/// Where and how activation emails go out
pub struct ActivationNotifier<'a> {
    /// Delivery backend
    pub mailer: &'a dyn MailSender,
    /// Product name used in the subject line
    pub app_name: &'a str,
    /// Link prefix; the token is appended as `?token=`
    pub activation_url_base: &'a str,
}

/// Authentication use cases
pub struct AuthService<'a> {
    users: UsersManager,
    auth: &'a AuthManager,
}

impl<'a> AuthService<'a> {
    /// Create a service over the users table and token manager
    #[must_use]
    pub const fn new(users: UsersManager, auth: &'a AuthManager) -> Self {
        Self { users, auth }
    }

    /// Validate input, enforce uniqueness, hash the password and store the user
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceAlreadyExists` for a taken email
    /// or username, or a database error
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email, role = role.as_str()))]
    pub async fn register(
        &self,
        registration: &Registration,
        role: UserRole,
        is_active: bool,
    ) -> AppResult<User> {
        validate_username(&registration.username)?;
        validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        if self.users.get_by_email(&registration.email).await?.is_some() {
            return Err(AppError::email_taken(&registration.email));
        }
        if self
            .users
            .get_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AppError::username_taken(&registration.username));
        }

        let hashed = self.auth.hash_password(&registration.password).await?;
        let user = User::new(
            registration.username.clone(),
            registration.email.clone(),
            hashed,
            role,
            is_active,
        );
        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Self-service registration: an inactive `USER` plus an activation email
    ///
    /// Mail delivery failures are logged; the account is kept either way.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`]
    pub async fn register_user(
        &self,
        registration: &Registration,
        notifier: &ActivationNotifier<'_>,
    ) -> AppResult<User> {
        let user = self.register(registration, UserRole::User, false).await?;

        let token = self.auth.generate_token(&user, TokenType::Activation)?;
        let message = activation_email(
            notifier.app_name,
            notifier.activation_url_base,
            &user.username,
            &user.email,
            &token,
        );
        if let Err(e) = notifier.mailer.send(&message).await {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send activation email");
        }

        Ok(user)
    }

    /// Exchange email and password for a token pair
    ///
    /// # Errors
    ///
    /// Returns `wrong_credentials` for an unknown email or bad password and
    /// `user_not_activated` for an inactive account
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let Some(user) = self.users.get_by_email(email).await? else {
            self.auth.verify_decoy_password(password).await?;
            return Err(AppError::wrong_credentials());
        };

        if !self
            .auth
            .verify_password(password, &user.hashed_password)
            .await?
        {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AppError::wrong_credentials());
        }
        if !user.is_active {
            return Err(AppError::user_not_activated(&user.username));
        }

        self.auth.generate_token_pair(&user)
    }

    /// Issue a new pair for a valid refresh token
    ///
    /// # Errors
    ///
    /// Returns a token error for expired, invalid or non-refresh tokens, and
    /// an authentication error when the user is gone or inactive
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.auth.validate_token(refresh_token, TokenType::Refresh)?;
        let user = self
            .users
            .get_by_id(claims.id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;
        if !user.is_active {
            return Err(AppError::user_not_activated(&user.username));
        }
        self.auth.generate_token_pair(&user)
    }

    /// Activate the account named by an activation token
    ///
    /// # Errors
    ///
    /// Returns a token error for bad tokens, `ResourceNotFound` for a
    /// missing user and a conflict when the account is already active
    pub async fn activate(&self, activation_token: &str) -> AppResult<User> {
        let claims = self
            .auth
            .validate_token(activation_token, TokenType::Activation)?;
        let user = self
            .users
            .get_by_id(claims.id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        if user.is_active {
            return Err(AppError::user_already_activated(&user.username));
        }

        let user = self.users.activate(user.id).await?;
        tracing::info!(user_id = %user.id, "User activated");
        Ok(user)
    }

    /// Resolve a bearer access token to an active user
    ///
    /// # Errors
    ///
    /// Returns a token error for bad tokens and an authentication error when
    /// the user is gone or inactive
    pub async fn authenticate(&self, access_token: &str) -> AppResult<User> {
        let claims = self.auth.validate_token(access_token, TokenType::Access)?;
        let user = self
            .users
            .get_by_id(claims.id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;
        if !user.is_active {
            return Err(AppError::user_not_activated(&user.username));
        }
        Ok(user)
    }

    /// Create the root account unless a user with that email already exists
    ///
    /// Returns the user and whether it was created.
    ///
    /// # Errors
    ///
    /// Returns a validation or database error
    pub async fn ensure_root_user(&self, registration: &Registration) -> AppResult<(User, bool)> {
        if let Some(existing) = self.users.get_by_email(&registration.email).await? {
            return Ok((existing, false));
        }
        let user = self.register(registration, UserRole::Root, true).await?;
        Ok((user, true))
    }
}

// ABOUTME: Profile management for the authenticated user
// ABOUTME: Validates username uniqueness, bio length and that avatars reference AVATAR media
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use giftminder_core::constants::limits;
use giftminder_core::models::{MediaType, User, UserProfileUpdate};
use giftminder_core::validation::{validate_length, validate_username};

use crate::database::{MediaManager, UsersManager};
use crate::errors::{AppError, AppResult};

/// Profile use cases
pub struct UserService {
    users: UsersManager,
    media: MediaManager,
}

impl UserService {
    /// Create a service over users and media metadata
    #[must_use]
    pub const fn new(users: UsersManager, media: MediaManager) -> Self {
        Self { users, media }
    }

    /// Update the caller's own profile
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceAlreadyExists` for a taken
    /// username or `ResourceNotFound` for an unknown avatar
    pub async fn update_profile(&self, user: &User, update: &UserProfileUpdate) -> AppResult<User> {
        if let Some(username) = &update.username {
            validate_username(username)?;
            if let Some(other) = self.users.get_by_username(username).await? {
                if other.id != user.id {
                    return Err(AppError::username_taken(username));
                }
            }
        }
        if let Some(bio) = &update.bio {
            validate_length("bio", bio, 0, limits::BIO_MAX)?;
        }
        if let Some(ava_id) = update.ava_id {
            let media = self
                .media
                .get(ava_id)
                .await?
                .ok_or_else(|| AppError::not_found("Media"))?;
            if media.media_type != MediaType::Avatar {
                return Err(AppError::invalid_input("ava_id must reference an avatar image"));
            }
        }

        self.users.update_profile(user.id, update).await
    }
}

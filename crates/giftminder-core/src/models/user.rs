// ABOUTME: User account model and role hierarchy
// ABOUTME: USER owns private data, ADMIN curates global data, ROOT manages admins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Regular account owning recipients, events and ideas
    #[default]
    User,
    /// Curator of global events and ideas
    Admin,
    /// Superuser able to register admins
    Root,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Root => "ROOT",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            "ROOT" => Some(Self::Root),
            _ => None,
        }
    }

    /// Admins and root share administrative privileges
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::Root)
    }
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Public handle, unique
    pub username: String,
    /// Login email, unique
    pub email: String,
    /// Role
    pub role: UserRole,
    /// Bcrypt hash, never serialised
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    /// False until the activation link is followed
    pub is_active: bool,
    /// Avatar media file
    pub ava_id: Option<Uuid>,
    /// Free text profile
    pub bio: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a new account that has not been persisted yet
    #[must_use]
    pub fn new(
        username: String,
        email: String,
        hashed_password: String,
        role: UserRole,
        is_active: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            role,
            hashed_password,
            is_active,
            ava_id: None,
            bio: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Whether the account has administrative privileges
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Partial profile update applied by `PATCH /users/me`
#[derive(Debug, Clone, Default)]
pub struct UserProfileUpdate {
    /// New username
    pub username: Option<String>,
    /// New bio
    pub bio: Option<String>,
    /// New avatar media id
    pub ava_id: Option<Uuid>,
}

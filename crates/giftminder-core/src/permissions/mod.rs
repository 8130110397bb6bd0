// ABOUTME: Ownership and role based access policies for recipients, events and ideas
// ABOUTME: Pure predicates evaluated by services before reading or mutating records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Access Policies
//!
//! Each entity has a policy type implementing [`AccessPolicy`]. Creation rules
//! differ per entity (recipients are created by plain users, global events and
//! ideas only by admins) so `can_create` lives on each policy as an inherent
//! function.
//!
//! ```text
//!              create                 view                    edit / delete
//! Recipient    role == USER           owner | admin           owner | admin
//! Event        admin == is_global     owner | global | admin  owner | admin
//! GiftIdea     admin == is_global     owner | global | admin  owner | admin
//! ```

use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Event, GiftIdea, Recipient, User, UserRole};

/// The caller as seen by policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Caller id
    pub id: Uuid,
    /// Caller role
    pub role: UserRole,
}

impl Actor {
    /// Build an actor from raw parts
    #[must_use]
    pub const fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }

    /// Whether the caller has administrative privileges
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    fn owns(&self, owner: Option<Uuid>) -> bool {
        owner == Some(self.id)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Read and write rules for an entity
pub trait AccessPolicy {
    /// Entity guarded by this policy
    type Resource;

    /// Whether `actor` may read `resource`
    fn can_view(actor: &Actor, resource: &Self::Resource) -> bool;

    /// Whether `actor` may modify `resource`
    fn can_edit(actor: &Actor, resource: &Self::Resource) -> bool;

    /// Whether `actor` may delete `resource`
    fn can_delete(actor: &Actor, resource: &Self::Resource) -> bool {
        Self::can_edit(actor, resource)
    }
}

/// Turn a policy decision into a 403
///
/// # Errors
///
/// Returns `PermissionDenied` when `allowed` is false
pub fn ensure(allowed: bool) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

/// Policy for recipients
pub struct RecipientPolicy;

impl RecipientPolicy {
    /// Only plain users keep recipients
    #[must_use]
    pub fn can_create(actor: &Actor) -> bool {
        actor.role == UserRole::User
    }
}

impl AccessPolicy for RecipientPolicy {
    type Resource = Recipient;

    fn can_view(actor: &Actor, resource: &Recipient) -> bool {
        actor.is_admin() || actor.owns(Some(resource.user_id))
    }

    fn can_edit(actor: &Actor, resource: &Recipient) -> bool {
        actor.is_admin() || actor.owns(Some(resource.user_id))
    }
}

/// Policy for calendar events
pub struct EventPolicy;

impl EventPolicy {
    /// Admins create global events, users create private ones
    #[must_use]
    pub fn can_create(actor: &Actor, is_global: bool) -> bool {
        actor.is_admin() == is_global
    }
}

impl AccessPolicy for EventPolicy {
    type Resource = Event;

    fn can_view(actor: &Actor, resource: &Event) -> bool {
        resource.is_global || actor.is_admin() || actor.owns(resource.user_id)
    }

    fn can_edit(actor: &Actor, resource: &Event) -> bool {
        actor.is_admin() || actor.owns(resource.user_id)
    }
}

/// Policy for gift ideas
pub struct IdeaPolicy;

impl IdeaPolicy {
    /// Admins create global ideas, users create private ones
    #[must_use]
    pub fn can_create(actor: &Actor, is_global: bool) -> bool {
        actor.is_admin() == is_global
    }
}

impl AccessPolicy for IdeaPolicy {
    type Resource = GiftIdea;

    fn can_view(actor: &Actor, resource: &GiftIdea) -> bool {
        resource.is_global || actor.is_admin() || actor.owns(resource.user_id)
    }

    fn can_edit(actor: &Actor, resource: &GiftIdea) -> bool {
        actor.is_admin() || actor.owns(resource.user_id)
    }
}

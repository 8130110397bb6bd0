// ABOUTME: Gift idea use cases gated by the idea access policy
// ABOUTME: Normalises prices to cents and validates product links before storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use giftminder_core::constants::limits;
use giftminder_core::models::{GiftIdea, GiftIdeaUpdate, IdeaScope, NewGiftIdea};
use giftminder_core::pagination::Pagination;
use giftminder_core::permissions::{ensure, AccessPolicy, Actor, IdeaPolicy};
use giftminder_core::validation::{normalize_price, validate_length, validate_view_url};
use uuid::Uuid;

use crate::database::IdeasManager;
use crate::errors::{AppError, AppResult};

fn validate_title(title: &str) -> AppResult<()> {
    validate_length("title", title, limits::IDEA_TITLE_MIN, limits::IDEA_TITLE_MAX)
}

fn checked_price(price: Option<f64>) -> AppResult<Option<f64>> {
    price.map(normalize_price).transpose()
}

/// Gift idea use cases
pub struct IdeaService {
    ideas: IdeasManager,
}

impl IdeaService {
    /// Create a service over the ideas table
    #[must_use]
    pub const fn new(ideas: IdeasManager) -> Self {
        Self { ideas }
    }

    /// Create an idea authored by the caller
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the role does not match `is_global`
    /// and a validation error for bad input
    #[tracing::instrument(skip(self, input), fields(actor = %actor.id, is_global = input.is_global))]
    pub async fn create(&self, actor: &Actor, input: NewGiftIdea) -> AppResult<GiftIdea> {
        ensure(IdeaPolicy::can_create(actor, input.is_global))?;
        validate_title(&input.title)?;
        if let Some(view_url) = &input.view_url {
            validate_view_url(view_url)?;
        }
        let estimated_price = checked_price(input.estimated_price)?;

        let idea = GiftIdea {
            id: Uuid::new_v4(),
            title: input.title,
            tags: input.tags,
            description: input.description,
            view_url: input.view_url,
            estimated_price,
            is_global: input.is_global,
            user_id: Some(actor.id),
            archived_at: None,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        self.ideas.create(&idea).await?;
        Ok(idea)
    }

    /// Ideas authored by the caller, or global ideas
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ordering or a failed query
    pub async fn list(
        &self,
        actor: &Actor,
        scope: IdeaScope,
        archived: bool,
        page: &Pagination,
    ) -> AppResult<Vec<GiftIdea>> {
        self.ideas.list(scope, actor.id, archived, page).await
    }

    /// Fetch an idea the caller may view
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn get(&self, actor: &Actor, idea_id: Uuid) -> AppResult<GiftIdea> {
        let idea = self
            .ideas
            .get(idea_id)
            .await?
            .ok_or_else(|| AppError::not_found("Idea"))?;
        ensure(IdeaPolicy::can_view(actor, &idea))?;
        Ok(idea)
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceNotFound` or `PermissionDenied`
    pub async fn update(
        &self,
        actor: &Actor,
        idea_id: Uuid,
        mut update: GiftIdeaUpdate,
    ) -> AppResult<GiftIdea> {
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        if let Some(Some(view_url)) = &update.view_url {
            validate_view_url(view_url)?;
        }
        if let Some(price) = update.estimated_price {
            update.estimated_price = Some(checked_price(price)?);
        }

        let idea = self.get(actor, idea_id).await?;
        ensure(IdeaPolicy::can_edit(actor, &idea))?;
        self.ideas.update(idea.id, &update).await
    }

    /// Mark an idea archived; archiving twice keeps the first timestamp
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn archive(&self, actor: &Actor, idea_id: Uuid) -> AppResult<GiftIdea> {
        let idea = self.get(actor, idea_id).await?;
        ensure(IdeaPolicy::can_edit(actor, &idea))?;
        self.ideas.archive(idea.id).await
    }

    /// Soft-delete an idea
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn delete(&self, actor: &Actor, idea_id: Uuid) -> AppResult<()> {
        let idea = self.get(actor, idea_id).await?;
        ensure(IdeaPolicy::can_delete(actor, &idea))?;
        self.ideas.soft_delete(idea.id).await?;
        tracing::info!(idea_id = %idea.id, actor = %actor.id, "Idea deleted");
        Ok(())
    }
}

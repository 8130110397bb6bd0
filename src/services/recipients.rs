// ABOUTME: Recipient use cases gated by the recipient access policy
// ABOUTME: Users manage their own recipients; admins may read and modify any of them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, Utc};
use giftminder_core::constants::limits;
use giftminder_core::models::{NewRecipient, Recipient, RecipientInfoUpdate};
use giftminder_core::pagination::Pagination;
use giftminder_core::permissions::{ensure, AccessPolicy, Actor, RecipientPolicy};
use giftminder_core::validation::{validate_birthday, validate_length, validate_preferences};
use uuid::Uuid;

use crate::database::RecipientsManager;
use crate::errors::{AppError, AppResult};

fn validate_name(name: &str) -> AppResult<()> {
    validate_length(
        "name",
        name,
        limits::RECIPIENT_NAME_MIN,
        limits::RECIPIENT_NAME_MAX,
    )
}

fn validate_relation(relation: &str) -> AppResult<()> {
    validate_length(
        "relation",
        relation,
        limits::RELATION_MIN,
        limits::RELATION_MAX,
    )
}

/// Recipient use cases
pub struct RecipientService {
    recipients: RecipientsManager,
}

impl RecipientService {
    /// Create a service over the recipients table
    #[must_use]
    pub const fn new(recipients: RecipientsManager) -> Self {
        Self { recipients }
    }

    /// Create a recipient owned by the caller
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for admins and a validation error for bad input
    #[tracing::instrument(skip(self, input), fields(actor = %actor.id))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewRecipient,
        today: NaiveDate,
    ) -> AppResult<Recipient> {
        ensure(RecipientPolicy::can_create(actor))?;
        validate_name(&input.name)?;
        validate_relation(&input.relation)?;
        validate_birthday(input.birthday, today)?;
        validate_preferences(input.preferences.as_deref())?;

        let recipient = Recipient {
            id: Uuid::new_v4(),
            user_id: actor.id,
            name: input.name,
            birthday: input.birthday,
            relation: input.relation,
            preferences: input.preferences,
            notes: input.notes,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.recipients.create(&recipient).await?;
        Ok(recipient)
    }

    /// Fetch a recipient the caller may view
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn get(&self, actor: &Actor, recipient_id: Uuid) -> AppResult<Recipient> {
        let recipient = self
            .recipients
            .get(recipient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipient"))?;
        ensure(RecipientPolicy::can_view(actor, &recipient))?;
        Ok(recipient)
    }

    /// The caller's recipients, or every recipient for admins
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ordering or a failed query
    pub async fn list(&self, actor: &Actor, page: &Pagination) -> AppResult<Vec<Recipient>> {
        let owner = (!actor.is_admin()).then_some(actor.id);
        self.recipients.list(owner, page).await
    }

    /// Update name, relation, preferences or notes
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceNotFound` or `PermissionDenied`
    pub async fn update_info(
        &self,
        actor: &Actor,
        recipient_id: Uuid,
        update: &RecipientInfoUpdate,
    ) -> AppResult<Recipient> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(relation) = &update.relation {
            validate_relation(relation)?;
        }
        validate_preferences(update.preferences.as_ref().and_then(Option::as_deref))?;

        let recipient = self.get(actor, recipient_id).await?;
        ensure(RecipientPolicy::can_edit(actor, &recipient))?;
        self.recipients.update_info(recipient.id, update).await
    }

    /// Replace the birthday
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceNotFound` or `PermissionDenied`
    pub async fn set_birthday(
        &self,
        actor: &Actor,
        recipient_id: Uuid,
        birthday: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<Recipient> {
        validate_birthday(birthday, today)?;
        let recipient = self.get(actor, recipient_id).await?;
        ensure(RecipientPolicy::can_edit(actor, &recipient))?;
        self.recipients.set_birthday(recipient.id, birthday).await
    }

    /// Delete a recipient; events that referenced it are kept without a recipient
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn delete(&self, actor: &Actor, recipient_id: Uuid) -> AppResult<()> {
        let recipient = self.get(actor, recipient_id).await?;
        ensure(RecipientPolicy::can_delete(actor, &recipient))?;
        self.recipients.delete(recipient.id).await?;
        tracing::info!(recipient_id = %recipient.id, actor = %actor.id, "Recipient deleted");
        Ok(())
    }
}

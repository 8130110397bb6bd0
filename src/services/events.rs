// ABOUTME: Event use cases gated by the event access policy
// ABOUTME: Creation materialises the first occurrence; listing attaches the next upcoming occurrence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use giftminder_core::constants::limits;
use giftminder_core::models::{Event, EventOccurrence, EventUpdate, NewEvent};
use giftminder_core::pagination::Pagination;
use giftminder_core::permissions::{ensure, AccessPolicy, Actor, EventPolicy, RecipientPolicy};
use giftminder_core::validation::{validate_date_range, validate_length};
use serde::Serialize;
use uuid::Uuid;

use crate::database::{EventsManager, RecipientsManager};
use crate::errors::{AppError, AppResult};

/// An event and its first occurrence on or after today
#[derive(Debug, Clone, Serialize)]
pub struct EventNext {
    /// The event
    #[serde(flatten)]
    pub event: Event,
    /// Upcoming occurrence, `None` for past one-off events
    pub next_occurrence: Option<EventOccurrence>,
}

/// An event with every stored occurrence
#[derive(Debug, Clone, Serialize)]
pub struct EventFull {
    /// The event
    #[serde(flatten)]
    pub event: Event,
    /// Occurrences in date order
    pub occurrences: Vec<EventOccurrence>,
}

/// Occurrences grouped by calendar date
pub type Calendar = BTreeMap<NaiveDate, Vec<EventOccurrence>>;

fn validate_title(title: &str) -> AppResult<()> {
    validate_length("title", title, 1, limits::EVENT_TITLE_MAX)
}

/// Event use cases
pub struct EventService {
    events: EventsManager,
    recipients: RecipientsManager,
}

impl EventService {
    /// Create a service over events and recipients
    #[must_use]
    pub const fn new(events: EventsManager, recipients: RecipientsManager) -> Self {
        Self { events, recipients }
    }

    /// Create an event and its first occurrence
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the role does not match `is_global`
    /// or the recipient is not visible, and a validation error for bad input
    #[tracing::instrument(skip(self, input), fields(actor = %actor.id, is_global = input.is_global))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewEvent,
        today: NaiveDate,
    ) -> AppResult<(Event, EventOccurrence)> {
        ensure(EventPolicy::can_create(actor, input.is_global))?;
        validate_title(&input.title)?;
        if input.start_date < today {
            return Err(AppError::past_event(today));
        }

        if let Some(recipient_id) = input.recipient_id {
            if input.is_global {
                return Err(AppError::invalid_input(
                    "Global events cannot reference a recipient",
                ));
            }
            let recipient = self
                .recipients
                .get(recipient_id)
                .await?
                .ok_or_else(|| AppError::not_found("Recipient"))?;
            ensure(RecipientPolicy::can_view(actor, &recipient))?;
        }

        let event = Event {
            id: Uuid::new_v4(),
            title: input.title,
            event_type: input.event_type,
            is_global: input.is_global,
            is_repeating: input.is_repeating,
            start_date: input.start_date,
            user_id: Some(actor.id),
            recipient_id: input.recipient_id,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        let first = self.events.create(&event).await?;
        Ok((event, first))
    }

    /// Fetch an event the caller may view
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn get(&self, actor: &Actor, event_id: Uuid) -> AppResult<Event> {
        let event = self
            .events
            .get(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event"))?;
        ensure(EventPolicy::can_view(actor, &event))?;
        Ok(event)
    }

    /// Fetch an event with all its occurrences
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn get_full(&self, actor: &Actor, event_id: Uuid) -> AppResult<EventFull> {
        let event = self.get(actor, event_id).await?;
        let occurrences = self.events.occurrences(event.id, None).await?;
        Ok(EventFull { event, occurrences })
    }

    /// Visible events, each with its next occurrence
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ordering or a failed query
    pub async fn list(
        &self,
        actor: &Actor,
        page: &Pagination,
        today: NaiveDate,
    ) -> AppResult<Vec<EventNext>> {
        let viewer = (!actor.is_admin()).then_some(actor.id);
        let events = self.events.list(viewer, page).await?;

        let mut listed = Vec::with_capacity(events.len());
        for event in events {
            let next_occurrence = self.events.next_occurrence(event.id, today).await?;
            listed.push(EventNext {
                event,
                next_occurrence,
            });
        }
        Ok(listed)
    }

    /// Occurrences of visible events between `from` and `to`, grouped by date
    ///
    /// # Errors
    ///
    /// Returns a validation error for a reversed or oversized range
    pub async fn calendar(&self, actor: &Actor, from: NaiveDate, to: NaiveDate) -> AppResult<Calendar> {
        validate_date_range(from, to)?;
        let viewer = (!actor.is_admin()).then_some(actor.id);

        let mut calendar = Calendar::new();
        for occurrence in self.events.occurrences_in_range(viewer, from, to).await? {
            calendar
                .entry(occurrence.occurrence_date)
                .or_default()
                .push(occurrence);
        }
        Ok(calendar)
    }

    /// Occurrences of one event between `from` and `to`
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceNotFound` or `PermissionDenied`
    pub async fn occurrences(
        &self,
        actor: &Actor,
        event_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<EventOccurrence>> {
        validate_date_range(from, to)?;
        let event = self.get(actor, event_id).await?;
        self.events.occurrences(event.id, Some((from, to))).await
    }

    /// Update title or type
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceNotFound` or `PermissionDenied`
    pub async fn update(&self, actor: &Actor, event_id: Uuid, update: &EventUpdate) -> AppResult<Event> {
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        let event = self.get(actor, event_id).await?;
        ensure(EventPolicy::can_edit(actor, &event))?;
        self.events.update(event.id, update).await
    }

    /// Soft-delete an event
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` or `PermissionDenied`
    pub async fn delete(&self, actor: &Actor, event_id: Uuid) -> AppResult<()> {
        let event = self.get(actor, event_id).await?;
        ensure(EventPolicy::can_delete(actor, &event))?;
        self.events.soft_delete(event.id).await?;
        tracing::info!(event_id = %event.id, actor = %actor.id, "Event deleted");
        Ok(())
    }
}

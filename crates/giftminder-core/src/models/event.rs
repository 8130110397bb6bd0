// ABOUTME: Calendar event and occurrence models
// ABOUTME: Events may repeat yearly and are materialised as dated occurrences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    /// Someone's birthday
    Birthday,
    /// Wedding or relationship anniversary
    Anniversary,
    /// Public or religious holiday
    Holiday,
    /// Anything else
    #[default]
    Other,
}

impl EventType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Birthday => "BIRTHDAY",
            Self::Anniversary => "ANNIVERSARY",
            Self::Holiday => "HOLIDAY",
            Self::Other => "OTHER",
        }
    }

    /// Parse from database string representation, unknown values become `Other`
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "BIRTHDAY" => Self::Birthday,
            "ANNIVERSARY" => Self::Anniversary,
            "HOLIDAY" => Self::Holiday,
            _ => Self::Other,
        }
    }
}

/// Calendar event owned by a user, or global when curated by an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: Uuid,
    /// Short title
    pub title: String,
    /// Kind of event
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Visible to every user
    pub is_global: bool,
    /// Repeats every year on the anniversary of `start_date`
    pub is_repeating: bool,
    /// First occurrence
    pub start_date: NaiveDate,
    /// Owning user
    pub user_id: Option<Uuid>,
    /// Recipient the event is about (never set on global events)
    pub recipient_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields required to create an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Short title
    pub title: String,
    /// Kind of event
    pub event_type: EventType,
    /// Visible to every user
    pub is_global: bool,
    /// Repeats yearly
    pub is_repeating: bool,
    /// First occurrence
    pub start_date: NaiveDate,
    /// Recipient the event is about
    pub recipient_id: Option<Uuid>,
}

/// Partial update of an event
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    /// New title
    pub title: Option<String>,
    /// New kind
    pub event_type: Option<EventType>,
}

/// One concrete dated instance of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOccurrence {
    /// Unique identifier
    pub id: Uuid,
    /// Date of this occurrence
    pub occurrence_date: NaiveDate,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Parent event
    pub event_id: Uuid,
}

// ABOUTME: Recipient model - a person a user buys gifts for
// ABOUTME: Carries birthday, relation and free-form gift preferences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person tracked by a user for gift giving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Date of birth
    pub birthday: NaiveDate,
    /// Relation to the owner ("sister", "colleague")
    pub relation: String,
    /// Gift preferences
    pub preferences: Option<Vec<String>>,
    /// Private notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields required to create a recipient
#[derive(Debug, Clone)]
pub struct NewRecipient {
    /// Display name
    pub name: String,
    /// Date of birth
    pub birthday: NaiveDate,
    /// Relation to the owner
    pub relation: String,
    /// Gift preferences
    pub preferences: Option<Vec<String>>,
    /// Private notes
    pub notes: Option<String>,
}

/// Partial update of the descriptive recipient fields
///
/// Nullable fields use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default)]
pub struct RecipientInfoUpdate {
    /// New name
    pub name: Option<String>,
    /// New relation
    pub relation: Option<String>,
    /// New preferences
    pub preferences: Option<Option<Vec<String>>>,
    /// New notes
    pub notes: Option<Option<String>>,
}

// ABOUTME: Gift idea model
// ABOUTME: Private ideas belong to a user, global ideas are curated by admins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gift idea
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftIdea {
    /// Unique identifier
    pub id: Uuid,
    /// Short title
    pub title: String,
    /// Free-form tags
    pub tags: Option<Vec<String>>,
    /// Longer description
    pub description: Option<String>,
    /// Link to a shop or product page
    pub view_url: Option<String>,
    /// Estimated price with two decimals
    pub estimated_price: Option<f64>,
    /// Visible to every user
    pub is_global: bool,
    /// Author
    pub user_id: Option<Uuid>,
    /// Archive marker
    pub archived_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl GiftIdea {
    /// Whether the idea has been archived
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Fields required to create an idea
#[derive(Debug, Clone)]
pub struct NewGiftIdea {
    /// Short title
    pub title: String,
    /// Free-form tags
    pub tags: Option<Vec<String>>,
    /// Longer description
    pub description: Option<String>,
    /// Link to a product page
    pub view_url: Option<String>,
    /// Estimated price
    pub estimated_price: Option<f64>,
    /// Visible to every user
    pub is_global: bool,
}

/// Partial update of an idea
///
/// Nullable fields use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default)]
pub struct GiftIdeaUpdate {
    /// New title
    pub title: Option<String>,
    /// New tags
    pub tags: Option<Option<Vec<String>>>,
    /// New description
    pub description: Option<Option<String>>,
    /// New link
    pub view_url: Option<Option<String>>,
    /// New price
    pub estimated_price: Option<Option<f64>>,
}

/// Which collection of ideas to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdeaScope {
    /// Ideas authored by the caller
    Own,
    /// Global ideas curated by admins
    Global,
}

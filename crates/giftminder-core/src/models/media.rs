// ABOUTME: Uploaded media file model and image format detection helpers
// ABOUTME: Media is addressed by content hash so identical uploads are stored once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purpose of an uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    /// Square profile picture
    Avatar,
    /// Illustration attached to ideas
    Content,
}

impl MediaType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Avatar => "AVATAR",
            Self::Content => "CONTENT",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AVATAR" => Some(Self::Avatar),
            "CONTENT" => Some(Self::Content),
            _ => None,
        }
    }

    /// Object key prefix
    #[must_use]
    pub const fn key_prefix(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Content => "content",
        }
    }
}

/// Accepted image encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// image/png
    Png,
    /// image/jpeg
    Jpeg,
}

impl ImageFormat {
    /// Resolve an allowed MIME type
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Canonical MIME type
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension used in object keys
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Stored media file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    /// Unique identifier
    pub id: Uuid,
    /// Public URL, unique
    pub url: String,
    /// SHA-256 of the content as lowercase hex, unique
    pub hash: String,
    /// Purpose
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Alternative text
    pub alt: Option<String>,
    /// MIME type
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Width divided by height
    pub ratio: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

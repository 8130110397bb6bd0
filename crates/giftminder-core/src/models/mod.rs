// ABOUTME: Domain models for users, recipients, events, gift ideas and media
// ABOUTME: Plain records shared by persistence, services and the HTTP layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Plain relational records. Identifiers are UUID v4, dates are calendar
//! dates without timezone, timestamps are UTC.

mod event;
mod idea;
mod media;
mod patch;
mod recipient;
mod user;

pub use event::{Event, EventOccurrence, EventType, EventUpdate, NewEvent};
pub use idea::{GiftIdea, GiftIdeaUpdate, IdeaScope, NewGiftIdea};
pub use media::{ImageFormat, MediaFile, MediaType};
pub use patch::nullable;
pub use recipient::{NewRecipient, Recipient, RecipientInfoUpdate};
pub use user::{User, UserProfileUpdate, UserRole};

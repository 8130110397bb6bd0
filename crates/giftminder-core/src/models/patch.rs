// ABOUTME: Serde helper separating absent, null and present fields in partial updates
// ABOUTME: Lets PATCH bodies clear nullable columns with an explicit null
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable PATCH field
///
/// Use together with `#[serde(default)]`: a missing key stays `None`, an
/// explicit `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
///
/// # Errors
///
/// Returns the deserializer error when the value has the wrong type
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

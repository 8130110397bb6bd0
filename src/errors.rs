// ABOUTME: Error types for the server crate, re-exported from giftminder-core
// ABOUTME: Keeps `crate::errors::AppError` paths stable for handlers, services and binaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use giftminder_core::errors::*;

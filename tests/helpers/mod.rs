// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the in-process HTTP request builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used)]

pub mod axum_test;

// ABOUTME: Request extractors that report decoding failures through the JSON error envelope
// ABOUTME: Wrap axum's Json, Query, Form, Path and Multipart and map their rejections to 400
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Extractors
//!
//! axum answers a body it cannot decode with a plain-text 422 or 400. These
//! wrappers turn every such rejection into `AppError::invalid_input`, so
//! clients always get a 400 with the `{"error": {...}}` body.

use axum::{
    async_trait,
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Multipart, Path, Query, Request,
    },
    http::request::Parts,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

fn decode_error(what: &str, body_text: &str) -> AppError {
    tracing::debug!(what, reason = %body_text, "Rejected undecodable request");
    AppError::invalid_input(format!("Invalid {what}: {body_text}"))
}

/// JSON request body
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|e: JsonRejection| decode_error("request body", &e.body_text()))
    }
}

/// URL-encoded form body
#[derive(Debug)]
pub struct AppForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Form::<T>::from_request(req, state)
            .await
            .map(|Form(value)| Self(value))
            .map_err(|e: FormRejection| decode_error("form body", &e.body_text()))
    }
}

/// Query string parameters
#[derive(Debug)]
pub struct AppQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|e: QueryRejection| decode_error("query string", &e.body_text()))
    }
}

/// Path parameters
#[derive(Debug)]
pub struct AppPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|e: PathRejection| decode_error("path parameter", &e.body_text()))
    }
}

/// Multipart body
pub struct AppMultipart(pub Multipart);

#[async_trait]
impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(Self)
            .map_err(|e| decode_error("multipart body", &e.body_text()))
    }
}
